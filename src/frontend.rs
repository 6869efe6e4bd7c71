//! Front-end pairing generation.
//!
//! A pairing is rendered from its own bundled tree into the nested
//! application directory. Pairings are always TypeScript and never go
//! through the projector.

use crate::catalog::FrontendDefinition;
use crate::constants::FRONTENDS_TREE;
use crate::error::{Error, Result};
use crate::processor::{OutputSink, RenameHook, TreeRenderer};
use crate::renderer::TemplateRenderer;
use log::debug;
use std::path::{Path, PathBuf};

/// Template file name standing in for the pairing's environment file.
pub const ENV_TEMPLATE_NAME: &str = "_env";

pub fn frontend_tree(templates_root: &Path, frontend: &FrontendDefinition) -> PathBuf {
    templates_root.join(FRONTENDS_TREE).join(&frontend.key)
}

pub fn app_directory(target: &Path, frontend: &FrontendDefinition) -> PathBuf {
    target.join(&frontend.app_directory)
}

/// Fails if the pairing's application directory is already on disk.
pub fn ensure_app_directory_free(target: &Path, frontend: &FrontendDefinition) -> Result<()> {
    let dir = app_directory(target, frontend);
    if dir.exists() {
        return Err(Error::FrontendDirectoryExists { path: dir });
    }
    Ok(())
}

/// Renders the pairing tree into `<target>/<app_directory>` and returns
/// that directory.
pub fn render_frontend(
    engine: &dyn TemplateRenderer,
    templates_root: &Path,
    frontend: &FrontendDefinition,
    target: &Path,
    context: &serde_json::Value,
    sink: &mut dyn OutputSink,
) -> Result<PathBuf> {
    let tree = frontend_tree(templates_root, frontend);
    if !tree.is_dir() {
        return Err(Error::TemplateError(format!(
            "no template tree for front-end '{}' at {}",
            frontend.key,
            tree.display()
        )));
    }

    let destination = app_directory(target, frontend);
    debug!("Rendering {} into {}", frontend.name, destination.display());
    let renames = RenameHook::new().rename(ENV_TEMPLATE_NAME, frontend.env_file_name.as_str());
    TreeRenderer::new(engine).with_hook(&renames).render(&tree, &destination, context, sink)?;
    Ok(destination)
}
