//! Common constants used throughout kiln.

/// Suffix marking a file that renders through the template engine.
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// Suffix (after directive stripping) marking content appended to an existing file.
pub const APPEND_SUFFIX: &str = ".append";

/// kiln's ignore file name, looked up in every template root
pub const IGNORE_FILE: &str = ".kilnignore";

/// Patterns ignored in every template tree
pub const DEFAULT_IGNORE_PATTERNS: [&str; 2] = ["**/.DS_Store", "**/Thumbs.db"];

/// Package name used when the project name normalizes to nothing.
pub const DEFAULT_PACKAGE_NAME: &str = "kiln-api";

/// Sentinel for "no front-end pairing".
pub const FRONTEND_NONE: &str = "none";

/// Template trees bundled with the crate.
pub const BUNDLED_TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Template root subdirectories.
pub const BASE_TREE: &str = "base";
pub const FEATURES_TREE: &str = "features";
pub const FRONTENDS_TREE: &str = "frontends";
