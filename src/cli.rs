//! Command-line interface implementation for kiln.
//! Provides argument parsing and help text formatting using clap.

use crate::answers::Answers;
use crate::request::{Dialect, PackageManager};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments structure for kiln.
#[derive(Parser, Debug)]
#[command(author, version, about = "kiln: API project scaffolding", long_about = None)]
pub struct Args {
    /// Directory the project is generated into
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Project name (defaults to the directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Source language of the generated service
    #[arg(long, value_enum, value_name = "LANGUAGE")]
    pub language: Option<Dialect>,

    /// Comma-separated feature keys; requirements are added automatically.
    /// An empty value selects none.
    #[arg(long, value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// Comma-separated provider keys
    #[arg(long, value_delimiter = ',')]
    pub providers: Option<Vec<String>>,

    /// Front-end pairing key, or "none"
    #[arg(long)]
    pub frontend: Option<String>,

    /// Package manager used in scripts and instructions
    #[arg(long, value_enum)]
    pub package_manager: Option<PackageManager>,

    /// Answers file, JSON or YAML
    #[arg(long, value_name = "FILE", conflicts_with = "stdin")]
    pub answers: Option<PathBuf>,

    /// Read JSON answers from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Template root holding the base, features and frontends trees
    #[arg(long, value_name = "DIR", env = "KILN_TEMPLATES")]
    pub templates: Option<PathBuf>,

    /// Report what would be generated without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Accept defaults instead of prompting, and run the post-generation steps
    #[arg(short, long)]
    pub yes: bool,

    /// Do not install packages or run tests after generation
    #[arg(long)]
    pub skip_post_steps: bool,

    /// Keep a partially generated directory when generation fails
    #[arg(long)]
    pub keep_partial: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The answers given as flags.
    pub fn answers(&self) -> Answers {
        Answers {
            name: self.name.clone(),
            language: self.language,
            features: self.features.as_ref().map(|keys| clean_keys(keys)),
            providers: self.providers.as_ref().map(|keys| clean_keys(keys)),
            frontend: self.frontend.clone(),
            package_manager: self.package_manager,
        }
    }
}

fn clean_keys(keys: &[String]) -> Vec<String> {
    keys.iter().map(|key| key.trim()).filter(|key| !key.is_empty()).map(str::to_string).collect()
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// With clap's default error handling on invalid arguments
pub fn get_args() -> Args {
    Args::parse()
}
