//! JavaScript projection of the TypeScript template trees.
//!
//! The projector is a [`FileHook`]: every `.ts` file coming out of a tree is
//! parsed, type-stripped and renamed to `.js`, declaration files and `tsconfig.json`
//! are dropped, and anything else passes through untouched.

mod strip;

pub use strip::{strip_types, StripError};

use crate::constants::APPEND_SUFFIX;
use crate::error::{Error, Result};
use crate::processor::{resolve_write_mode, FileHook, HookOutcome, WriteMode};
use log::debug;
use std::path::Path;

/// Files with no place in a JavaScript project.
const SUPPRESSED_FILES: [&str; 1] = ["tsconfig.json"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DialectProjector;

impl DialectProjector {
    pub fn new() -> Self {
        Self
    }
}

impl FileHook for DialectProjector {
    fn on_file(&self, relative_dir: &Path, file_name: &str, contents: &[u8]) -> Result<HookOutcome> {
        let (name, mode) = resolve_write_mode(file_name);
        if name.ends_with(".d.ts") || SUPPRESSED_FILES.contains(&name) {
            debug!("Suppressing {} for JavaScript output", relative_dir.join(name).display());
            return Ok(HookOutcome::Suppress);
        }
        let Some(stem) = name.strip_suffix(".ts") else {
            return Ok(HookOutcome::Unchanged);
        };

        let file = relative_dir.join(file_name).display().to_string();
        let source = std::str::from_utf8(contents).map_err(|e| Error::ProjectionFailure {
            file: file.clone(),
            line: 0,
            reason: format!("not valid UTF-8 ({e})"),
        })?;
        let stripped = strip_types(source).map_err(|e| Error::ProjectionFailure {
            file,
            line: e.line,
            reason: e.reason,
        })?;

        let mut projected = format!("{stem}.js");
        if mode == WriteMode::Append {
            projected.push_str(APPEND_SUFFIX);
        }
        debug!("Projected {} -> {projected}", relative_dir.join(file_name).display());
        Ok(HookOutcome::Replace { file_name: projected, contents: stripped.into_bytes() })
    }
}
