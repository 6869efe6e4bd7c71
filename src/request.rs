//! The generation request and the small enumerations it is built from.

use crate::constants::FRONTEND_NONE;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source-code projection of the generated service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Statically typed; the template trees are written in it.
    #[default]
    #[value(name = "typescript", alias = "ts")]
    #[serde(alias = "ts")]
    TypeScript,
    /// Dynamically typed; projected from the TypeScript trees.
    #[value(name = "javascript", alias = "js")]
    #[serde(alias = "js")]
    JavaScript,
}

impl Dialect {
    pub fn source_extension(&self) -> &'static str {
        match self {
            Dialect::TypeScript => "ts",
            Dialect::JavaScript => "js",
        }
    }

    pub fn is_projected(&self) -> bool {
        matches!(self, Dialect::JavaScript)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::TypeScript => write!(f, "typescript"),
            Dialect::JavaScript => write!(f, "javascript"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    pub fn name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
        }
    }

    pub fn install(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm install",
            PackageManager::Pnpm => "pnpm install",
            PackageManager::Yarn => "yarn install",
        }
    }

    /// Prefix for running a manifest script.
    pub fn run(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm run",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Prefix for running a locally installed binary.
    pub fn exec(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npx",
            PackageManager::Pnpm => "pnpm exec",
            PackageManager::Yarn => "yarn exec",
        }
    }

    pub fn run_script(&self, script: &str) -> String {
        format!("{} {script}", self.run())
    }

    pub fn test(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm test",
            PackageManager::Pnpm => "pnpm test",
            PackageManager::Yarn => "yarn test",
        }
    }

    /// Runs `script` from the manifest of the nested application in `dir`.
    pub fn run_in_dir(&self, dir: &str, script: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm --prefix {dir} run {script}"),
            PackageManager::Pnpm => format!("pnpm --dir {dir} run {script}"),
            PackageManager::Yarn => format!("yarn --cwd {dir} {script}"),
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything the engine needs to generate one project.
///
/// Built once from merged command-line, answers-file and prompt input and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub project_name: String,
    pub target_directory: PathBuf,
    pub dialect: Dialect,
    pub features: Vec<String>,
    pub package_manager: PackageManager,
    pub providers: Vec<String>,
    pub frontend: String,
    pub dry_run: bool,
}

impl GenerationRequest {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(project_name: S, target_directory: P) -> Self {
        Self {
            project_name: project_name.into(),
            target_directory: target_directory.into(),
            dialect: Dialect::default(),
            features: Vec::new(),
            package_manager: PackageManager::default(),
            providers: Vec::new(),
            frontend: FRONTEND_NONE.to_string(),
            dry_run: false,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_features<S: AsRef<str>>(mut self, features: &[S]) -> Self {
        self.features = features.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    pub fn with_providers<S: AsRef<str>>(mut self, providers: &[S]) -> Self {
        self.providers = providers.iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    pub fn with_frontend<S: Into<String>>(mut self, frontend: S) -> Self {
        self.frontend = frontend.into();
        self
    }

    pub fn with_package_manager(mut self, package_manager: PackageManager) -> Self {
        self.package_manager = package_manager;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Checks the request fields that do not need the catalog.
    pub fn validate(&self) -> Result<()> {
        if self.project_name.trim().is_empty() {
            return Err(Error::ValidationError("project name must not be empty".to_string()));
        }
        if !self.target_directory.is_absolute() {
            return Err(Error::ValidationError(format!(
                "target directory '{}' must be an absolute path",
                self.target_directory.display()
            )));
        }
        Ok(())
    }
}

/// Rejects a destination that exists and is a file, or a non-empty directory.
///
/// Runs before the first write of a generation run.
pub fn ensure_safe_destination<P: AsRef<Path>>(target: P) -> Result<()> {
    let target = target.as_ref();
    if !target.exists() {
        return Ok(());
    }
    if !target.is_dir() {
        return Err(Error::DestinationNotADirectory { path: target.to_path_buf() });
    }
    if std::fs::read_dir(target)?.next().is_some() {
        return Err(Error::DestinationNotEmpty { path: target.to_path_buf() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_package_manager_nested_run() {
        assert_eq!(PackageManager::Npm.run_in_dir("web", "dev"), "npm --prefix web run dev");
        assert_eq!(PackageManager::Pnpm.run_in_dir("web", "build"), "pnpm --dir web run build");
        assert_eq!(PackageManager::Yarn.run_in_dir("web", "start"), "yarn --cwd web start");
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let request = GenerationRequest::new("   ", "/tmp/out");
        assert!(matches!(request.validate(), Err(Error::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_relative_target() {
        let request = GenerationRequest::new("api", "out");
        assert!(matches!(request.validate(), Err(Error::ValidationError(_))));
    }

    #[test]
    fn test_ensure_safe_destination() {
        let temp_dir = TempDir::new().unwrap();
        assert!(ensure_safe_destination(temp_dir.path().join("fresh")).is_ok());
        assert!(ensure_safe_destination(temp_dir.path()).is_ok());

        std::fs::write(temp_dir.path().join("file.txt"), "x").unwrap();
        assert!(matches!(
            ensure_safe_destination(temp_dir.path()),
            Err(Error::DestinationNotEmpty { .. })
        ));
        assert!(matches!(
            ensure_safe_destination(temp_dir.path().join("file.txt")),
            Err(Error::DestinationNotADirectory { .. })
        ));
    }
}
