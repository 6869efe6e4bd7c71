//! Template tree rendering.
//!
//! A template tree is walked in file-name order. Files whose name ends with
//! `.j2` render through the context and lose the suffix; every other file is
//! copied byte for byte. Each file then passes through the configured
//! [`FileHook`]s, which may leave it alone, rename and rewrite it, or drop it,
//! before it reaches an [`OutputSink`].

use crate::constants::{APPEND_SUFFIX, TEMPLATE_SUFFIX};
use crate::error::{Error, Result};
use crate::ignore::parse_ignore_file;
use crate::renderer::TemplateRenderer;
use indexmap::IndexMap;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a hook decided to do with one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Write the file as it is.
    Unchanged,
    /// Write `contents` under `file_name` instead, in the same directory.
    Replace { file_name: String, contents: Vec<u8> },
    /// Write nothing.
    Suppress,
}

/// Per-file interception point between rendering and writing.
pub trait FileHook {
    /// # Arguments
    /// * `relative_dir` - Directory of the file relative to the template root
    /// * `file_name` - Destination file name, directive suffix already removed
    /// * `contents` - Rendered or copied bytes
    fn on_file(&self, relative_dir: &Path, file_name: &str, contents: &[u8]) -> Result<HookOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Replace,
    Append,
}

/// Destination of rendered files.
pub trait OutputSink {
    fn write(&mut self, path: &Path, contents: &[u8], mode: WriteMode) -> Result<()>;

    /// Removes `dir` and everything below it. Returns whether there was
    /// anything to remove; a missing directory is not an error.
    fn remove_dir(&mut self, dir: &Path) -> Result<bool>;

    /// Paths written so far, in first-write order.
    fn paths(&self) -> Vec<PathBuf>;
}

/// Writes straight to the filesystem, creating parent directories on demand.
#[derive(Debug, Default)]
pub struct DiskSink {
    written: Vec<PathBuf>,
}

impl DiskSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for DiskSink {
    fn write(&mut self, path: &Path, contents: &[u8], mode: WriteMode) -> Result<()> {
        let failure = |source| Error::TemplateWriteFailure { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(failure)?;
        }
        match mode {
            WriteMode::Replace => fs::write(path, contents).map_err(failure)?,
            WriteMode::Append => fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(contents))
                .map_err(failure)?,
        }

        if !self.written.iter().any(|p| p == path) {
            self.written.push(path.to_path_buf());
        }
        Ok(())
    }

    fn remove_dir(&mut self, dir: &Path) -> Result<bool> {
        let present = dir.is_dir();
        if present {
            debug!("Removing directory: {}", dir.display());
            fs::remove_dir_all(dir)
                .map_err(|source| Error::TemplateWriteFailure { path: dir.to_path_buf(), source })?;
        }
        self.written.retain(|path| !path.starts_with(dir));
        Ok(present)
    }

    fn paths(&self) -> Vec<PathBuf> {
        self.written.clone()
    }
}

/// Keeps would-be output in memory; nothing touches the filesystem.
#[derive(Debug, Default)]
pub struct DryRunSink {
    files: IndexMap<PathBuf, Vec<u8>>,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self, path: &Path) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }
}

impl OutputSink for DryRunSink {
    fn write(&mut self, path: &Path, contents: &[u8], mode: WriteMode) -> Result<()> {
        let entry = self.files.entry(path.to_path_buf()).or_default();
        if mode == WriteMode::Replace {
            entry.clear();
        }
        entry.extend_from_slice(contents);
        Ok(())
    }

    fn remove_dir(&mut self, dir: &Path) -> Result<bool> {
        let planned = self.files.len();
        self.files.retain(|path, _| !path.starts_with(dir));
        Ok(self.files.len() < planned)
    }

    fn paths(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }
}

/// Returns the destination file name and whether the file renders.
pub fn resolve_file_name(file_name: &str) -> (&str, bool) {
    match file_name.strip_suffix(TEMPLATE_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => (stripped, true),
        _ => (file_name, false),
    }
}

/// Splits the append marker off a destination file name.
pub fn resolve_write_mode(file_name: &str) -> (&str, WriteMode) {
    match file_name.strip_suffix(APPEND_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => (stripped, WriteMode::Append),
        _ => (file_name, WriteMode::Replace),
    }
}

/// Walks template trees and hands every produced file to a sink.
pub struct TreeRenderer<'a> {
    engine: &'a dyn TemplateRenderer,
    hooks: Vec<&'a dyn FileHook>,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(engine: &'a dyn TemplateRenderer) -> Self {
        Self { engine, hooks: Vec::new() }
    }

    /// Appends a hook; hooks run in the order they were added, each seeing
    /// the previous one's output.
    pub fn with_hook(mut self, hook: &'a dyn FileHook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Renders every file under `template_root` into `destination_root`.
    ///
    /// # Errors
    /// * `Error::TemplateReadFailure` if a template entry cannot be read
    /// * `Error::TemplateError` if a `.j2` file fails to render
    /// * whatever the sink or a hook returns; files written before the
    ///   failure stay written
    pub fn render(
        &self,
        template_root: &Path,
        destination_root: &Path,
        context: &serde_json::Value,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        debug!("Rendering template tree {}", template_root.display());
        let ignored = parse_ignore_file(template_root)?;

        let walker = WalkDir::new(template_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| match entry.path().strip_prefix(template_root) {
                Ok(relative) => relative.as_os_str().is_empty() || !ignored.is_match(relative),
                Err(_) => true,
            });

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(template_root).to_path_buf();
                Error::TemplateReadFailure { path, source: e.into() }
            })?;
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let relative = path
                .strip_prefix(template_root)
                .map_err(|e| Error::TemplateError(e.to_string()))?;
            let relative_dir = relative.parent().unwrap_or_else(|| Path::new(""));
            let source_name = relative
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| Error::TemplateError(format!("invalid file name: {}", relative.display())))?;

            debug!("Processing source file: {}", relative.display());

            let (file_name, is_template) = resolve_file_name(source_name);
            let contents = if is_template {
                let template = fs::read_to_string(path)
                    .map_err(|source| Error::TemplateReadFailure { path: path.to_path_buf(), source })?;
                self.engine
                    .render(&template, context)
                    .map_err(|e| Error::TemplateError(format!("{}: {e}", relative.display())))?
                    .into_bytes()
            } else {
                fs::read(path).map_err(|source| Error::TemplateReadFailure { path: path.to_path_buf(), source })?
            };
            // A template whose body is wrapped in a false condition produces no file
            if is_template && contents.iter().all(u8::is_ascii_whitespace) {
                debug!("Skipping {} (renders empty)", relative.display());
                continue;
            }

            let Some((file_name, contents)) = self.apply_hooks(relative_dir, file_name, contents)? else {
                debug!("Skipping {} (suppressed)", relative.display());
                continue;
            };

            let (file_name, mode) = resolve_write_mode(&file_name);
            let target = destination_root.join(relative_dir).join(file_name);
            match mode {
                WriteMode::Replace => debug!("Writing file: {}", target.display()),
                WriteMode::Append => debug!("Appending to file: {}", target.display()),
            }
            sink.write(&target, &contents, mode)?;
        }
        Ok(())
    }

    fn apply_hooks(
        &self,
        relative_dir: &Path,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Option<(String, Vec<u8>)>> {
        let mut file_name = file_name.to_string();
        let mut contents = contents;
        for hook in &self.hooks {
            match hook.on_file(relative_dir, &file_name, &contents)? {
                HookOutcome::Unchanged => {}
                HookOutcome::Replace { file_name: name, contents: bytes } => {
                    file_name = name;
                    contents = bytes;
                }
                HookOutcome::Suppress => return Ok(None),
            }
        }
        Ok(Some((file_name, contents)))
    }
}

/// Renames files whose real name cannot live in a template tree.
///
/// Package tools drop dot-files when publishing, so templates carry
/// `_gitignore` and friends.
#[derive(Debug, Clone, Default)]
pub struct RenameHook {
    renames: IndexMap<String, String>,
}

impl RenameHook {
    pub fn new() -> Self {
        Self::default().rename("_gitignore", ".gitignore")
    }

    pub fn rename<S: Into<String>>(mut self, from: S, to: S) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }
}

impl FileHook for RenameHook {
    fn on_file(&self, _relative_dir: &Path, file_name: &str, contents: &[u8]) -> Result<HookOutcome> {
        // The append marker stays on so renamed files can still extend others.
        let (base, mode) = resolve_write_mode(file_name);
        match self.renames.get(base) {
            Some(renamed) => {
                let file_name = match mode {
                    WriteMode::Replace => renamed.clone(),
                    WriteMode::Append => format!("{renamed}{APPEND_SUFFIX}"),
                };
                Ok(HookOutcome::Replace { file_name, contents: contents.to_vec() })
            }
            None => Ok(HookOutcome::Unchanged),
        }
    }
}
