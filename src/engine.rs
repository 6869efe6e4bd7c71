//! The template generation engine.
//!
//! Runs one generation request end to end: validation and catalog lookups,
//! feature resolution, the render context, the API trees (base first, then
//! each feature in resolved order), the front-end pairing and finally the
//! post-generation adjustments. Everything that can be rejected is rejected
//! before the first write.

use crate::adjuster::adjust;
use crate::catalog::Catalog;
use crate::constants::{BASE_TREE, BUNDLED_TEMPLATES, FEATURES_TREE};
use crate::context::{ContextBuilder, RenderContext};
use crate::error::{Error, Result};
use crate::frontend::{ensure_app_directory_free, render_frontend};
use crate::processor::{DiskSink, DryRunSink, OutputSink, RenameHook, TreeRenderer};
use crate::projector::DialectProjector;
use crate::renderer::MiniJinjaRenderer;
use crate::request::{ensure_safe_destination, GenerationRequest};
use crate::resolver::resolve_features;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// What a generation run produced, or would have produced in a dry run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub context: RenderContext,
    /// Files written (or planned), in first-write order.
    pub files: Vec<PathBuf>,
    /// Subtrees removed by the adjuster.
    pub removed: Vec<PathBuf>,
    pub dry_run: bool,
}

impl GenerationReport {
    /// `files` relative to the target directory.
    pub fn relative_files(&self, target: &Path) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.strip_prefix(target).unwrap_or(f).to_path_buf()).collect()
    }
}

pub struct Engine<'a> {
    catalog: &'a Catalog,
    templates_root: PathBuf,
    renderer: MiniJinjaRenderer,
    now: Option<DateTime<Utc>>,
}

impl<'a> Engine<'a> {
    pub fn new<P: Into<PathBuf>>(catalog: &'a Catalog, templates_root: P) -> Self {
        Self { catalog, templates_root: templates_root.into(), renderer: MiniJinjaRenderer::new(), now: None }
    }

    /// Pins the context timestamps, for reproducible output.
    pub fn generated_at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn templates_root(&self) -> &Path {
        &self.templates_root
    }

    /// # Errors
    /// * `Error::ValidationError` for a blank name or relative target
    /// * `Error::UnknownCatalogKey` for any unknown feature, provider or front-end
    /// * `Error::DestinationNotEmpty` / `Error::DestinationNotADirectory`
    /// * `Error::TemplateReadFailure`, `Error::TemplateWriteFailure`,
    ///   `Error::ProjectionFailure` during the walk; earlier writes are kept
    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationReport> {
        request.validate()?;

        let resolved = resolve_features(self.catalog, &request.features)?;
        for key in &request.providers {
            self.catalog.provider(key)?;
        }
        let frontend = self.catalog.frontend(&request.frontend)?;

        let mut builder = ContextBuilder::new(self.catalog);
        if let Some(now) = self.now {
            builder = builder.generated_at(now);
        }
        let context = builder.build(request, &resolved)?;
        let value = context.to_value()?;

        let base = self.templates_root.join(BASE_TREE);
        if !base.is_dir() {
            return Err(Error::TemplateError(format!("no base template tree at {}", base.display())));
        }

        let target = request.target_directory.as_path();
        let mut sink: Box<dyn OutputSink> = if request.dry_run {
            Box::new(DryRunSink::new())
        } else {
            ensure_safe_destination(target)?;
            if let Some(frontend) = frontend {
                ensure_app_directory_free(target, frontend)?;
            }
            Box::new(DiskSink::new())
        };

        info!(
            "Generating {} project '{}' in {}",
            request.dialect,
            context.project.package_name,
            target.display()
        );

        let renames = RenameHook::new();
        let projector = DialectProjector::new();
        let mut api = TreeRenderer::new(&self.renderer).with_hook(&renames);
        if request.dialect.is_projected() {
            api = api.with_hook(&projector);
        }

        api.render(&base, target, &value, sink.as_mut())?;
        for key in resolved.keys() {
            let tree = self.templates_root.join(FEATURES_TREE).join(key);
            if tree.is_dir() {
                api.render(&tree, target, &value, sink.as_mut())?;
            } else {
                debug!("Feature '{key}' has no template tree");
            }
        }

        if let Some(frontend) = frontend {
            render_frontend(&self.renderer, &self.templates_root, frontend, target, &value, sink.as_mut())?;
        }

        let removed = adjust(target, &context.flags, sink.as_mut())?;

        Ok(GenerationReport { files: sink.paths(), removed, context, dry_run: request.dry_run })
    }
}

/// Generates `request` from the bundled template trees and catalog.
pub fn generate(request: &GenerationRequest) -> Result<GenerationReport> {
    let catalog = Catalog::builtin();
    Engine::new(&catalog, BUNDLED_TEMPLATES).generate(request)
}
