//! Runtime packages, development packages and scripts of the generated project.

use crate::catalog::{FrontendDefinition, ProviderDefinition};
use crate::request::{Dialect, PackageManager};
use crate::resolver::ResolvedFeatureSet;
use indexmap::IndexMap;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

/// Packages and scripts written into `package.json`.
///
/// Entries are unique by name. Adding a name twice keeps its first position
/// and the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyManifest {
    #[serde(serialize_with = "packages")]
    dependencies: IndexMap<String, String>,
    #[serde(serialize_with = "packages")]
    dev_dependencies: IndexMap<String, String>,
    #[serde(serialize_with = "scripts")]
    scripts: IndexMap<String, String>,
}

impl DependencyManifest {
    pub fn add_dependency(&mut self, name: &str, version: &str) -> &mut Self {
        self.dependencies.insert(name.to_string(), version.to_string());
        self
    }

    pub fn add_dev_dependency(&mut self, name: &str, version: &str) -> &mut Self {
        self.dev_dependencies.insert(name.to_string(), version.to_string());
        self
    }

    pub fn add_script<S: Into<String>>(&mut self, name: &str, command: S) -> &mut Self {
        self.scripts.insert(name.to_string(), command.into());
        self
    }

    pub fn dependencies(&self) -> &IndexMap<String, String> {
        &self.dependencies
    }

    pub fn dev_dependencies(&self) -> &IndexMap<String, String> {
        &self.dev_dependencies
    }

    pub fn scripts(&self) -> &IndexMap<String, String> {
        &self.scripts
    }

    pub fn has_package(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }
}

// Templates iterate entries in order, so maps go out as lists of records.
fn packages<S: Serializer>(map: &IndexMap<String, String>, serializer: S) -> Result<S::Ok, S::Error> {
    entries(map, "version", serializer)
}

fn scripts<S: Serializer>(map: &IndexMap<String, String>, serializer: S) -> Result<S::Ok, S::Error> {
    entries(map, "command", serializer)
}

fn entries<S: Serializer>(
    map: &IndexMap<String, String>,
    value_field: &'static str,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    struct Entry<'a>(&'a str, &'a str, &'static str);

    impl Serialize for Entry<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut record = serializer.serialize_struct("Entry", 2)?;
            record.serialize_field("name", self.0)?;
            record.serialize_field(self.2, self.1)?;
            record.end()
        }
    }

    let mut seq = serializer.serialize_seq(Some(map.len()))?;
    for (name, value) in map {
        seq.serialize_element(&Entry(name, value, value_field))?;
    }
    seq.end()
}

/// Script names added by the object-relational-mapper provider.
pub const MAPPER_SCRIPTS: [&str; 6] =
    ["prisma:generate", "prisma:migrate", "prisma:deploy", "prisma:pull", "db:migrate", "db:seed"];

/// Script names every generated project carries.
pub const BASE_SCRIPTS: [&str; 7] = ["dev", "build", "start", "test", "lint", "format", "api"];

/// Folds the dialect defaults with per-feature, per-provider and front-end
/// additions.
pub fn assemble(
    dialect: Dialect,
    features: &ResolvedFeatureSet,
    providers: &[&ProviderDefinition],
    frontend: Option<&FrontendDefinition>,
    package_manager: PackageManager,
) -> DependencyManifest {
    let mut manifest = DependencyManifest::default();
    let typed = dialect == Dialect::TypeScript;

    base(&mut manifest, dialect);

    for key in features.keys() {
        match key.as_str() {
            "auth" => {
                manifest.add_dependency("bcryptjs", "^2.4.3").add_dependency("jsonwebtoken", "^9.0.2");
                if typed {
                    manifest
                        .add_dev_dependency("@types/bcryptjs", "^2.4.6")
                        .add_dev_dependency("@types/jsonwebtoken", "^9.0.7");
                }
            }
            "mailer" => {
                manifest.add_dependency("nodemailer", "^6.9.16");
                if typed {
                    manifest.add_dev_dependency("@types/nodemailer", "^6.4.17");
                }
            }
            _ => {}
        }
    }

    for provider in providers {
        match provider.key.as_str() {
            "postgres" => {
                manifest.add_dependency("pg", "^8.13.1");
                if typed {
                    manifest.add_dev_dependency("@types/pg", "^8.11.10");
                }
            }
            "mysql" => {
                manifest.add_dependency("mysql2", "^3.12.0");
            }
            "mongodb" => {
                manifest.add_dependency("mongodb", "^6.12.0");
            }
            "prisma" => {
                manifest
                    .add_dependency("@prisma/client", "^6.2.1")
                    .add_dev_dependency("prisma", "^6.2.1")
                    .add_script("prisma:generate", "prisma generate")
                    .add_script("prisma:migrate", "prisma migrate dev")
                    .add_script("prisma:deploy", "prisma migrate deploy")
                    .add_script("prisma:pull", "prisma db pull")
                    .add_script("db:migrate", "prisma migrate deploy && prisma generate")
                    .add_script("db:seed", "prisma db seed");
            }
            "s3" => {
                manifest.add_dependency("@aws-sdk/client-s3", "^3.731.1");
            }
            _ => {}
        }
    }

    if let Some(frontend) = frontend {
        let dir = frontend.app_directory.as_str();
        let serve = if frontend.key == "react-vite" { "preview" } else { "start" };
        for script in ["dev", "build", serve] {
            manifest.add_script(&format!("web:{script}"), package_manager.run_in_dir(dir, script));
        }
    }

    manifest
}

fn base(manifest: &mut DependencyManifest, dialect: Dialect) {
    manifest
        .add_dependency("express", "^4.21.2")
        .add_dependency("pino", "^9.6.0")
        .add_dependency("pino-http", "^10.4.0")
        .add_dependency("zod", "^3.24.1")
        .add_dependency("helmet", "^8.0.0")
        .add_dependency("express-rate-limit", "^7.5.0")
        .add_dependency("swagger-ui-express", "^5.0.1")
        .add_dependency("cors", "^2.8.5")
        .add_dependency("dotenv", "^16.4.7");

    let (dev, build, start, api) = match dialect {
        Dialect::TypeScript => {
            manifest
                .add_dev_dependency("typescript", "^5.7.3")
                .add_dev_dependency("tsx", "^4.19.2")
                .add_dev_dependency("@types/node", "^22.10.7")
                .add_dev_dependency("@types/express", "^4.17.21")
                .add_dev_dependency("@types/cors", "^2.8.17")
                .add_dev_dependency("@types/swagger-ui-express", "^4.1.7")
                .add_dev_dependency("@types/supertest", "^6.0.2")
                .add_dev_dependency("typescript-eslint", "^8.20.0");
            ("tsx watch src/server.ts", "tsc -p tsconfig.json", "node dist/server.js", "tsx src/cli/api.ts")
        }
        Dialect::JavaScript => {
            manifest.add_dev_dependency("globals", "^15.14.0");
            ("node --watch src/server.js", "node --check src/server.js", "node src/server.js", "node src/cli/api.js")
        }
    };

    manifest
        .add_dev_dependency("vitest", "^3.0.2")
        .add_dev_dependency("supertest", "^7.0.0")
        .add_dev_dependency("eslint", "^9.18.0")
        .add_dev_dependency("@eslint/js", "^9.18.0")
        .add_dev_dependency("prettier", "^3.4.2")
        .add_dev_dependency("pino-pretty", "^13.0.0");
    manifest
        .add_script("dev", dev)
        .add_script("build", build)
        .add_script("start", start)
        .add_script("test", "vitest run")
        .add_script("lint", "eslint .")
        .add_script("format", "prettier --write .")
        .add_script("api", api);
}
