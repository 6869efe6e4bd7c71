//! Transitive closure of requested features over their declared requirements.

use crate::catalog::{Catalog, FeatureDefinition};
use crate::error::{Error, Result};
use indexmap::IndexSet;
use log::debug;

/// Features selected for a generation run, each listed after everything it
/// requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFeatureSet {
    keys: Vec<String>,
}

impl ResolvedFeatureSet {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Looks the resolved keys back up in the catalog they were resolved against.
    pub fn definitions<'c>(&self, catalog: &'c Catalog) -> Result<Vec<&'c FeatureDefinition>> {
        self.keys.iter().map(|key| catalog.feature(key)).collect()
    }
}

/// Resolves `requested` to its closure, in depth-first first-seen order.
///
/// Every requirement is visited before the feature requiring it, so the
/// result is a topological order. Resolving an already resolved list yields
/// the same list.
///
/// # Errors
/// * `Error::UnknownCatalogKey` if a requested key is not in the catalog
/// * `Error::UnresolvableDependency` if a requirement is not in the catalog
/// * `Error::CyclicFeatureDependency` if the requirement graph loops
pub fn resolve_features<S: AsRef<str>>(catalog: &Catalog, requested: &[S]) -> Result<ResolvedFeatureSet> {
    let mut visited = IndexSet::new();
    let mut path = Vec::new();

    for key in requested {
        let key = key.as_ref();
        catalog.feature(key)?;
        visit(catalog, key, &mut path, &mut visited)?;
    }

    let keys: Vec<String> = visited.into_iter().collect();
    debug!("Resolved features: {}", keys.join(", "));
    Ok(ResolvedFeatureSet { keys })
}

fn visit(
    catalog: &Catalog,
    key: &str,
    path: &mut Vec<String>,
    visited: &mut IndexSet<String>,
) -> Result<()> {
    if visited.contains(key) {
        return Ok(());
    }
    if let Some(start) = path.iter().position(|k| k == key) {
        let mut cycle = path[start..].to_vec();
        cycle.push(key.to_string());
        return Err(Error::CyclicFeatureDependency { cycle });
    }

    let feature = catalog.feature(key)?;
    path.push(key.to_string());
    for requirement in &feature.requires {
        if catalog.feature(requirement).is_err() {
            return Err(Error::UnresolvableDependency {
                feature: key.to_string(),
                requirement: requirement.clone(),
            });
        }
        visit(catalog, requirement, path, visited)?;
    }
    path.pop();

    visited.insert(key.to_string());
    Ok(())
}
