//! The render context: the one value every template file is rendered against.

use crate::catalog::{
    Catalog, FeatureDefinition, FrontendDefinition, ProviderCategory, ProviderDefinition,
};
use crate::constants::DEFAULT_PACKAGE_NAME;
use crate::error::{Error, Result};
use crate::manifest::{assemble, DependencyManifest};
use crate::request::{Dialect, GenerationRequest, PackageManager};
use crate::resolver::ResolvedFeatureSet;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use cruet::Inflector;
use indexmap::IndexSet;
use log::debug;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid separator pattern"));

/// Names the generated project goes by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectIdentity {
    /// As typed by the user, trimmed.
    pub name: String,
    /// `package.json` name.
    pub package_name: String,
    pub title: String,
    pub pascal_name: String,
    /// One-line description for `package.json` and the README.
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManagerCommands {
    pub name: &'static str,
    pub install: &'static str,
    pub run: &'static str,
    pub exec: &'static str,
    pub test: &'static str,
}

impl From<PackageManager> for PackageManagerCommands {
    fn from(pm: PackageManager) -> Self {
        Self { name: pm.name(), install: pm.install(), run: pm.run(), exec: pm.exec(), test: pm.test() }
    }
}

/// Booleans templates branch on instead of inspecting selections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Flags {
    pub has_auth: bool,
    pub has_user_crud: bool,
    pub has_mailer: bool,
    pub has_notifications: bool,
    pub has_database: bool,
    pub has_relational_database: bool,
    pub has_mongodb: bool,
    pub has_prisma: bool,
    pub has_object_storage: bool,
    pub has_frontend: bool,
}

/// Dialect-specific values, tagged with the dialect they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DialectExtras {
    TypeScript { target: &'static str, module: &'static str },
    JavaScript { module_type: &'static str },
}

impl From<Dialect> for DialectExtras {
    fn from(dialect: Dialect) -> Self {
        match dialect {
            Dialect::TypeScript => DialectExtras::TypeScript { target: "ES2022", module: "NodeNext" },
            Dialect::JavaScript => DialectExtras::JavaScript { module_type: "module" },
        }
    }
}

/// Read-only environment for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    pub project: ProjectIdentity,
    pub dialect: Dialect,
    pub source_extension: &'static str,
    pub features: Vec<FeatureDefinition>,
    pub feature_keys: Vec<String>,
    pub providers: Vec<ProviderDefinition>,
    pub provider_keys: Vec<String>,
    pub frontend: Option<FrontendDefinition>,
    pub manifest: DependencyManifest,
    pub package_manager: PackageManagerCommands,
    pub flags: Flags,
    pub generated_at: String,
    pub year: i32,
    pub dialect_extras: DialectExtras,
}

impl RenderContext {
    /// The context as handed to the template engine.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| Error::TemplateError(e.to_string()))
    }
}

/// Builds a [`RenderContext`] from a request already validated against the catalog.
pub struct ContextBuilder<'a> {
    catalog: &'a Catalog,
    now: Option<DateTime<Utc>>,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog, now: None }
    }

    /// Pins the timestamp fields instead of reading the clock.
    pub fn generated_at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// # Errors
    /// Any catalog lookup failure here means the request skipped validation.
    pub fn build(&self, request: &GenerationRequest, resolved: &ResolvedFeatureSet) -> Result<RenderContext> {
        let features: Vec<FeatureDefinition> =
            resolved.definitions(self.catalog)?.into_iter().cloned().collect();
        let providers = request
            .providers
            .iter()
            .collect::<IndexSet<_>>()
            .into_iter()
            .map(|key| self.catalog.provider(key))
            .collect::<Result<Vec<_>>>()?;
        let frontend = self.catalog.frontend(&request.frontend)?;

        let manifest = assemble(request.dialect, resolved, &providers, frontend, request.package_manager);
        let flags = flags(resolved, &providers, frontend);
        let now = self.now.unwrap_or_else(Utc::now);

        let context = RenderContext {
            project: identity(&request.project_name),
            dialect: request.dialect,
            source_extension: request.dialect.source_extension(),
            feature_keys: features.iter().map(|f| f.key.clone()).collect(),
            features,
            provider_keys: providers.iter().map(|p| p.key.clone()).collect(),
            providers: providers.into_iter().cloned().collect(),
            frontend: frontend.cloned(),
            manifest,
            package_manager: request.package_manager.into(),
            flags,
            generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            year: now.year(),
            dialect_extras: request.dialect.into(),
        };
        debug!(
            "Render context for '{}': features [{}], providers [{}]",
            context.project.package_name,
            context.feature_keys.join(", "),
            context.provider_keys.join(", ")
        );
        Ok(context)
    }
}

fn flags(
    features: &ResolvedFeatureSet,
    providers: &[&ProviderDefinition],
    frontend: Option<&FrontendDefinition>,
) -> Flags {
    let has_category = |category| providers.iter().any(|p| p.category == category);
    Flags {
        has_auth: features.contains("auth"),
        has_user_crud: features.contains("userCrud"),
        has_mailer: features.contains("mailer"),
        has_notifications: features.contains("notifications"),
        has_database: has_category(ProviderCategory::Database),
        has_relational_database: providers
            .iter()
            .any(|p| p.category == ProviderCategory::Database && p.relational),
        has_mongodb: providers.iter().any(|p| p.key == "mongodb"),
        has_prisma: has_category(ProviderCategory::ObjectMapper),
        has_object_storage: has_category(ProviderCategory::ObjectStorage),
        has_frontend: frontend.is_some(),
    }
}

/// Lower-cases `name`, collapses every run of other characters into one `-`
/// and trims separators from both ends.
pub fn normalize_package_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let collapsed = NON_ALPHANUMERIC.replace_all(&lowered, "-");
    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        DEFAULT_PACKAGE_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

fn identity(name: &str) -> ProjectIdentity {
    let name = name.trim().to_string();
    let package_name = normalize_package_name(&name);
    let spaced = package_name.replace('-', " ");
    let title = spaced.to_title_case();
    ProjectIdentity {
        description: format!("{title} HTTP API"),
        pascal_name: spaced.to_pascal_case(),
        title,
        name,
        package_name,
    }
}
