//! Registries of the optional modules a generated project can carry.
//!
//! A [`Catalog`] is built once and passed by reference to everything that needs
//! it; nothing in kiln reaches for a global registry. Tests build alternate
//! catalogs with [`Catalog::new`].

use crate::constants::FRONTEND_NONE;
use crate::error::{CatalogKind, Error, Result};
use indexmap::IndexMap;
use serde::Serialize;

/// An optional capability slice of the generated service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureDefinition {
    pub key: String,
    pub name: String,
    pub description: String,
    pub summary: String,
    pub requires: Vec<String>,
}

impl FeatureDefinition {
    pub fn new(key: &str, name: &str, description: &str, summary: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            summary: summary.to_string(),
            requires: Vec::new(),
        }
    }

    pub fn requires(mut self, keys: &[&str]) -> Self {
        self.requires = keys.iter().map(|k| k.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderCategory {
    Database,
    ObjectMapper,
    ObjectStorage,
}

/// Readiness reported by the generated `/status` endpoint before the provider
/// is wired to a live backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Ready,
    Pending,
}

/// A persistence or storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDefinition {
    pub key: String,
    pub name: String,
    pub description: String,
    pub summary: String,
    pub category: ProviderCategory,
    /// Only meaningful for [`ProviderCategory::Database`].
    pub relational: bool,
    pub status: ProviderStatus,
    pub status_details: String,
}

/// A front-end application generated next to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrontendDefinition {
    pub key: String,
    pub name: String,
    pub description: String,
    pub summary: String,
    pub app_directory: String,
    pub env_file_name: String,
}

/// Feature, provider and front-end registries.
///
/// Each registry keeps presentation order and answers keyed lookups.
#[derive(Debug, Clone)]
pub struct Catalog {
    features: IndexMap<String, FeatureDefinition>,
    providers: IndexMap<String, ProviderDefinition>,
    frontends: IndexMap<String, FrontendDefinition>,
}

impl Catalog {
    pub fn new(
        features: Vec<FeatureDefinition>,
        providers: Vec<ProviderDefinition>,
        frontends: Vec<FrontendDefinition>,
    ) -> Self {
        Self {
            features: features.into_iter().map(|f| (f.key.clone(), f)).collect(),
            providers: providers.into_iter().map(|p| (p.key.clone(), p)).collect(),
            frontends: frontends.into_iter().map(|f| (f.key.clone(), f)).collect(),
        }
    }

    /// The catalog shipped with kiln, matching the bundled template trees.
    pub fn builtin() -> Self {
        let features = vec![
            FeatureDefinition::new(
                "auth",
                "Authentication",
                "JWT login and registration with hashed passwords",
                "POST /auth/register and POST /auth/login issuing signed tokens",
            ),
            FeatureDefinition::new(
                "userCrud",
                "User management",
                "CRUD endpoints for users, protected by authentication",
                "GET/POST/PATCH/DELETE /users behind a bearer token",
            )
            .requires(&["auth"]),
            FeatureDefinition::new(
                "mailer",
                "Mailer",
                "Outgoing e-mail through SMTP",
                "Mail service backed by nodemailer",
            ),
            FeatureDefinition::new(
                "notifications",
                "Notifications",
                "User notifications delivered by e-mail",
                "POST /notifications sending mail to registered users",
            )
            .requires(&["userCrud", "mailer"]),
        ];

        let providers = vec![
            provider(
                "postgres",
                "PostgreSQL",
                "Relational database through node-postgres",
                ProviderCategory::Database,
                true,
                "Set DATABASE_URL to connect to PostgreSQL",
            ),
            provider(
                "mysql",
                "MySQL",
                "Relational database through mysql2",
                ProviderCategory::Database,
                true,
                "Set DATABASE_URL to connect to MySQL",
            ),
            provider(
                "mongodb",
                "MongoDB",
                "Document database through the official driver",
                ProviderCategory::Database,
                false,
                "Set MONGODB_URI to connect to MongoDB",
            ),
            provider(
                "prisma",
                "Prisma",
                "Object-relational mapper with schema migrations",
                ProviderCategory::ObjectMapper,
                false,
                "Run the prisma:generate script, then prisma:migrate",
            ),
            provider(
                "s3",
                "Amazon S3",
                "Object storage through the AWS SDK",
                ProviderCategory::ObjectStorage,
                false,
                "Set S3_BUCKET and AWS credentials",
            ),
        ];

        let frontends = vec![
            FrontendDefinition {
                key: "react-vite".to_string(),
                name: "React + Vite".to_string(),
                description: "Single-page React console built with Vite".to_string(),
                summary: "Client-side console polling GET /status".to_string(),
                app_directory: "web".to_string(),
                env_file_name: ".env.local".to_string(),
            },
            FrontendDefinition {
                key: "nextjs".to_string(),
                name: "Next.js".to_string(),
                description: "Next.js App Router console".to_string(),
                summary: "Server-rendered console reading GET /status".to_string(),
                app_directory: "web".to_string(),
                env_file_name: ".env.local".to_string(),
            },
        ];

        Self::new(features, providers, frontends)
    }

    pub fn features(&self) -> impl Iterator<Item = &FeatureDefinition> {
        self.features.values()
    }

    pub fn providers(&self) -> impl Iterator<Item = &ProviderDefinition> {
        self.providers.values()
    }

    pub fn frontends(&self) -> impl Iterator<Item = &FrontendDefinition> {
        self.frontends.values()
    }

    pub fn feature(&self, key: &str) -> Result<&FeatureDefinition> {
        self.features.get(key).ok_or_else(|| unknown(CatalogKind::Feature, key, self.features.keys()))
    }

    pub fn provider(&self, key: &str) -> Result<&ProviderDefinition> {
        self.providers
            .get(key)
            .ok_or_else(|| unknown(CatalogKind::Provider, key, self.providers.keys()))
    }

    /// Looks up a front-end pairing; `"none"` selects no pairing.
    pub fn frontend(&self, key: &str) -> Result<Option<&FrontendDefinition>> {
        if key == FRONTEND_NONE {
            return Ok(None);
        }
        self.frontends.get(key).map(Some).ok_or_else(|| {
            let valid = std::iter::once(FRONTEND_NONE.to_string())
                .chain(self.frontends.keys().cloned())
                .collect::<Vec<_>>();
            Error::UnknownCatalogKey { kind: CatalogKind::Frontend, key: key.to_string(), valid }
        })
    }

    /// Checks that every requirement names a catalog feature and that the
    /// requirement graph has no cycles.
    pub fn validate(&self) -> Result<()> {
        for feature in self.features.values() {
            for requirement in &feature.requires {
                if !self.features.contains_key(requirement) {
                    return Err(Error::UnresolvableDependency {
                        feature: feature.key.clone(),
                        requirement: requirement.clone(),
                    });
                }
            }
        }
        let all: Vec<&str> = self.features.keys().map(String::as_str).collect();
        crate::resolver::resolve_features(self, &all).map(|_| ())
    }
}

fn provider(
    key: &str,
    name: &str,
    description: &str,
    category: ProviderCategory,
    relational: bool,
    status_details: &str,
) -> ProviderDefinition {
    ProviderDefinition {
        key: key.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        summary: format!("{name}: {description}"),
        category,
        relational,
        status: ProviderStatus::Pending,
        status_details: status_details.to_string(),
    }
}

fn unknown<'a>(kind: CatalogKind, key: &str, valid: impl Iterator<Item = &'a String>) -> Error {
    Error::UnknownCatalogKey { kind, key: key.to_string(), valid: valid.cloned().collect() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_well_formed() {
        let catalog = Catalog::builtin();
        assert!(catalog.validate().is_ok());
        assert_eq!(
            catalog.features().map(|f| f.key.as_str()).collect::<Vec<_>>(),
            vec!["auth", "userCrud", "mailer", "notifications"]
        );
    }

    #[test]
    fn test_unknown_feature_lists_valid_keys() {
        let catalog = Catalog::builtin();
        match catalog.feature("doesNotExist") {
            Err(Error::UnknownCatalogKey { kind, key, valid }) => {
                assert_eq!(kind, CatalogKind::Feature);
                assert_eq!(key, "doesNotExist");
                assert_eq!(valid, vec!["auth", "userCrud", "mailer", "notifications"]);
            }
            other => panic!("Expected UnknownCatalogKey, got {other:?}"),
        }
    }

    #[test]
    fn test_frontend_none_selects_nothing() {
        let catalog = Catalog::builtin();
        assert!(catalog.frontend("none").unwrap().is_none());
        assert_eq!(catalog.frontend("nextjs").unwrap().unwrap().app_directory, "web");

        let err = catalog.frontend("angular").unwrap_err();
        assert!(err.to_string().contains("none, react-vite, nextjs"));
    }

    #[test]
    fn test_validate_rejects_missing_requirement() {
        let catalog = Catalog::new(
            vec![FeatureDefinition::new("a", "A", "", "").requires(&["ghost"])],
            vec![],
            vec![],
        );
        assert!(matches!(
            catalog.validate(),
            Err(Error::UnresolvableDependency { ref feature, ref requirement })
                if feature == "a" && requirement == "ghost"
        ));
    }
}
