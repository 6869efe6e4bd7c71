//! Error handling for kiln.
//! Defines the error taxonomy shared by the engine and the command surface.

use std::path::PathBuf;
use thiserror::Error;

/// The catalog an unknown key was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Feature,
    Provider,
    Frontend,
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogKind::Feature => write!(f, "feature"),
            CatalogKind::Provider => write!(f, "provider"),
            CatalogKind::Frontend => write!(f, "frontend"),
        }
    }
}

/// Custom error types for kiln operations.
///
/// Catalog and resolution errors are raised before anything touches the
/// filesystem. I/O errors raised during a template walk abort the walk and
/// leave whatever was already written in place.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    /// An unrecognised feature, provider or front-end key was requested.
    #[error("Unknown {kind} '{key}'. Valid values: {}.", valid.join(", "))]
    UnknownCatalogKey { kind: CatalogKind, key: String, valid: Vec<String> },

    /// A feature requires another feature that is not in the catalog.
    #[error("Feature '{feature}' requires '{requirement}', which is not in the catalog.")]
    UnresolvableDependency { feature: String, requirement: String },

    /// The requirement graph loops back on itself.
    #[error("Cyclic feature dependency: {}.", cycle.join(" -> "))]
    CyclicFeatureDependency { cycle: Vec<String> },

    #[error("Directory '{}' is not empty. Choose an empty directory or a new name.", path.display())]
    DestinationNotEmpty { path: PathBuf },

    #[error("'{}' already exists and is not a directory.", path.display())]
    DestinationNotADirectory { path: PathBuf },

    #[error("Failed to read template '{}': {source}.", path.display())]
    TemplateReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}.", path.display())]
    TemplateWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The type stripper could not erase a rendered source file.
    #[error("Failed to project '{file}' to JavaScript at line {line}: {reason}.")]
    ProjectionFailure { file: String, line: usize, reason: String },

    /// Represents errors that occur during template rendering
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// Errors coming from the minijinja engine
    #[error("Template error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents errors that occur while reading answers or other configuration
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Interactive prompt failures
    #[error("Prompt error: {0}.")]
    PromptError(String),

    /// Represents validation failures in the generation request
    #[error("Validation error: {0}.")]
    ValidationError(String),

    #[error("Front-end directory '{}' already exists. Remove it or choose another location.", path.display())]
    FrontendDirectoryExists { path: PathBuf },
}

impl Error {
    /// Whether the user can fix the problem by changing their input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::UnknownCatalogKey { .. }
                | Error::DestinationNotEmpty { .. }
                | Error::DestinationNotADirectory { .. }
                | Error::ValidationError(_)
                | Error::ConfigError(_)
                | Error::FrontendDirectoryExists { .. }
        )
    }
}

/// Convenience type alias for Results with kiln's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
pub fn default_error_handler(err: Error) {
    eprintln!("{}", describe(&err));
    std::process::exit(1);
}

/// The message printed for `err`. Input mistakes are raised before anything
/// is written, so they come with a hint to retry.
pub fn describe(err: &Error) -> String {
    if err.is_recoverable() {
        format!("{err}\nNothing was generated. Adjust the input and run kiln again.")
    } else {
        format!("Generation failed: {err}")
    }
}
