//! Pre-supplied answers and their completion into a generation request.
//!
//! Answers come from three places, strongest first: command-line flags, an
//! answers file (JSON or YAML) or a JSON document on stdin, and finally the
//! interactive prompts. Every layer is an [`Answers`] value with optional
//! fields; [`Answers::or`] folds a weaker layer under a stronger one.

use crate::catalog::Catalog;
use crate::constants::FRONTEND_NONE;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::request::{Dialect, GenerationRequest, PackageManager};
use log::debug;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Answers {
    #[serde(alias = "projectName")]
    pub name: Option<String>,
    #[serde(alias = "dialect")]
    pub language: Option<Dialect>,
    pub features: Option<Vec<String>>,
    pub providers: Option<Vec<String>>,
    pub frontend: Option<String>,
    pub package_manager: Option<PackageManager>,
}

impl Answers {
    /// Field-wise: keeps every answer of `self`, fills the gaps from `fallback`.
    pub fn or(self, fallback: Answers) -> Answers {
        Answers {
            name: self.name.or(fallback.name),
            language: self.language.or(fallback.language),
            features: self.features.or(fallback.features),
            providers: self.providers.or(fallback.providers),
            frontend: self.frontend.or(fallback.frontend),
            package_manager: self.package_manager.or(fallback.package_manager),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.language.is_some()
            && self.features.is_some()
            && self.providers.is_some()
            && self.frontend.is_some()
            && self.package_manager.is_some()
    }

    /// Builds the request; unanswered fields take their defaults.
    pub fn into_request<P: Into<PathBuf>>(self, target: P, dry_run: bool) -> GenerationRequest {
        let target = target.into();
        let name = self.name.unwrap_or_else(|| default_project_name(&target));
        GenerationRequest::new(name, target)
            .with_dialect(self.language.unwrap_or_default())
            .with_features(&self.features.unwrap_or_default())
            .with_providers(&self.providers.unwrap_or_default())
            .with_frontend(self.frontend.unwrap_or_else(|| FRONTEND_NONE.to_string()))
            .with_package_manager(self.package_manager.unwrap_or_default())
            .dry_run(dry_run)
    }
}

/// Parses an answers document, trying JSON first and YAML second.
///
/// Blank input means "no answers".
pub fn parse_answers(contents: &str) -> Result<Answers> {
    if contents.trim().is_empty() {
        return Ok(Answers::default());
    }
    match serde_json::from_str(contents) {
        Ok(answers) => Ok(answers),
        Err(json_err) => serde_yaml::from_str(contents).map_err(|yaml_err| {
            Error::ConfigError(format!("answers are neither JSON ({json_err}) nor YAML ({yaml_err})"))
        }),
    }
}

pub fn load_answers_file<P: AsRef<Path>>(path: P) -> Result<Answers> {
    let path = path.as_ref();
    debug!("Loading answers from {}", path.display());
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("cannot read answers file '{}': {e}", path.display())))?;
    parse_answers(&contents)
}

/// Reads a JSON answers document from standard input.
pub fn load_answers_from_stdin() -> Result<Answers> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    let buffer = buffer.trim();
    if buffer.is_empty() {
        return Ok(Answers::default());
    }
    serde_json::from_str(buffer).map_err(|e| Error::ConfigError(format!("invalid answers on stdin: {e}")))
}

/// Name suggested for a project generated into `target`.
pub fn default_project_name(target: &Path) -> String {
    target.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Asks for every field still missing from `answers`, in the order the
/// request is built.
pub fn complete_answers(
    answers: Answers,
    catalog: &Catalog,
    prompt: &dyn Prompter,
    target: &Path,
) -> Result<Answers> {
    let name = match answers.name {
        Some(name) => name,
        None => prompt.input("Project name", &default_project_name(target))?,
    };

    let language = match answers.language {
        Some(language) => language,
        None => {
            let items = ["TypeScript".to_string(), "JavaScript".to_string()];
            match prompt.select("Language", &items, 0)? {
                0 => Dialect::TypeScript,
                _ => Dialect::JavaScript,
            }
        }
    };

    let features = match answers.features {
        Some(features) => features,
        None => {
            let keys: Vec<&str> = catalog.features().map(|f| f.key.as_str()).collect();
            let items: Vec<String> = catalog.features().map(|f| format!("{}: {}", f.name, f.description)).collect();
            pick_many(prompt, "Features (requirements are added automatically)", &keys, &items)?
        }
    };

    let providers = match answers.providers {
        Some(providers) => providers,
        None => {
            let keys: Vec<&str> = catalog.providers().map(|p| p.key.as_str()).collect();
            let items: Vec<String> = catalog.providers().map(|p| format!("{}: {}", p.name, p.description)).collect();
            pick_many(prompt, "Providers", &keys, &items)?
        }
    };

    let frontend = match answers.frontend {
        Some(frontend) => frontend,
        None => {
            let mut keys = vec![FRONTEND_NONE.to_string()];
            let mut items = vec!["None".to_string()];
            for frontend in catalog.frontends() {
                keys.push(frontend.key.clone());
                items.push(format!("{}: {}", frontend.name, frontend.description));
            }
            let index = prompt.select("Front-end", &items, 0)?;
            keys.into_iter().nth(index).unwrap_or_else(|| FRONTEND_NONE.to_string())
        }
    };

    let package_manager = match answers.package_manager {
        Some(package_manager) => package_manager,
        None => {
            let managers = [PackageManager::Npm, PackageManager::Pnpm, PackageManager::Yarn];
            let items: Vec<String> = managers.iter().map(|pm| pm.name().to_string()).collect();
            let index = prompt.select("Package manager", &items, 0)?;
            managers.get(index).copied().unwrap_or_default()
        }
    };

    Ok(Answers {
        name: Some(name),
        language: Some(language),
        features: Some(features),
        providers: Some(providers),
        frontend: Some(frontend),
        package_manager: Some(package_manager),
    })
}

fn pick_many(prompt: &dyn Prompter, question: &str, keys: &[&str], items: &[String]) -> Result<Vec<String>> {
    let picked = prompt.multi_select(question, items, &vec![false; items.len()])?;
    Ok(picked.into_iter().filter_map(|i| keys.get(i)).map(|key| key.to_string()).collect())
}
