//! File and directory ignore pattern handling for template trees.
//! Each template root may carry a .kilnignore file whose glob patterns
//! exclude paths from rendering, similar to .gitignore functionality.

use crate::constants::{DEFAULT_IGNORE_PATTERNS, IGNORE_FILE};
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::path::Path;

/// Reads `<template_root>/.kilnignore` and compiles it with the default patterns.
///
/// # Notes
/// - A missing ignore file only yields the defaults
/// - Blank lines and lines starting with `#` are skipped
/// - The ignore file itself is always ignored
///
/// # Example
/// ```ignore
/// # Contents of .kilnignore:
/// *.orig
/// drafts/**
/// ```
pub fn parse_ignore_file<P: AsRef<Path>>(template_root: P) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_IGNORE_PATTERNS.iter().copied().chain([IGNORE_FILE]) {
        builder.add(compile(pattern)?);
    }

    let ignore_path = template_root.as_ref().join(IGNORE_FILE);
    if let Ok(contents) = std::fs::read_to_string(&ignore_path) {
        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            builder.add(compile(line)?);
        }
    } else {
        debug!("{} does not exist", ignore_path.display());
    }

    builder.build().map_err(|e| Error::ConfigError(format!("{IGNORE_FILE} loading failed: {e}")))
}

fn compile(pattern: &str) -> Result<Glob> {
    Glob::new(pattern).map_err(|e| Error::ConfigError(format!("{IGNORE_FILE} loading failed: {e}")))
}
