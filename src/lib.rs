//! kiln generates ready-to-run HTTP API projects from bundled template trees.
//! A generation request names the language, optional features, persistence
//! providers and a front-end pairing; the engine resolves feature
//! requirements, builds one render context and renders the base tree, every
//! feature tree and the pairing tree into the target directory.

/// Removal of mapper subtrees once every tree is rendered
pub mod adjuster;

/// Answers from flags, answers files, stdin and prompts
pub mod answers;

/// Feature, provider and front-end registries
pub mod catalog;

/// Command-line interface module for the kiln application
pub mod cli;

pub mod constants;

/// Render context construction
pub mod context;

/// End-to-end generation of one request
pub mod engine;

/// Error types and handling for the kiln application
pub mod error;

/// Front-end pairing trees
pub mod frontend;

/// Post-generation steps and closing instructions
pub mod hooks;

/// File and directory ignore patterns
/// Processes .kilnignore files to exclude specific paths
pub mod ignore;

/// package.json dependencies and scripts
pub mod manifest;

/// Template tree walking, file hooks and output sinks
pub mod processor;

/// TypeScript to JavaScript projection
pub mod projector;

/// User input and interaction handling
pub mod prompt;

pub mod renderer;

/// The generation request and its enumerations
pub mod request;

/// Feature requirement resolution
pub mod resolver;

pub use engine::{generate, Engine, GenerationReport};
