//! Image dimension annotation.
//!
//! Walks a content root, runs [`markup::rewrite_document`] over every
//! Markdown file and writes back only the files that changed. Explicit
//! `width`/`height` let the browser reserve space before an image loads,
//! so the page does not shift under the reader.
//!
//! Image sources are resolved against a single base directory (the working
//! directory by default), not against the referencing document:
//!
//! ```text
//! projects/2024/chair.md:  <img src="/pics/chair.jpg">
//! resolved:                <image_base>/pics/chair.jpg
//! ```
//!
//! Nothing short of a missing root stops the run. Unreadable documents,
//! missing images and undecodable images are reported in the returned
//! [`AnnotateSummary`] and skipped.

use crate::imaging::{DimensionResolver, RustBackend};
use crate::markup::{self, Probe, RewriteEvent};
use crate::scan;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("Directory {} not found.", .0.display())]
    RootNotFound(PathBuf),
}

/// Settings for one annotation run.
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    pub root: PathBuf,
    pub image_base: PathBuf,
    pub extensions: Vec<String>,
    /// Rewrite and report, but leave files on disk untouched.
    pub dry_run: bool,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Unchanged,
    Updated,
    /// Would have been updated, but this is a dry run.
    WouldUpdate,
    ReadFailed(String),
    WriteFailed(String),
}

#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub status: DocumentStatus,
    pub events: Vec<RewriteEvent>,
}

impl DocumentReport {
    /// File name used in diagnostics (`chair.md`, not the full path).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnotateSummary {
    pub documents: Vec<DocumentReport>,
}

impl AnnotateSummary {
    pub fn updated_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.status, DocumentStatus::Updated | DocumentStatus::WouldUpdate))
            .count()
    }
}

/// Map an image source to a path under `image_base`.
///
/// All leading `/` are stripped so site-absolute sources stay inside the base.
pub fn resolve_source(image_base: &Path, src: &str) -> PathBuf {
    image_base.join(src.trim_start_matches('/'))
}

/// Look up one source: existence check, then the resolver.
fn probe_source(resolver: &impl DimensionResolver, image_base: &Path, src: &str) -> Probe {
    let path = resolve_source(image_base, src);
    if !path.exists() {
        return Probe::Missing(std::path::absolute(&path).unwrap_or(path));
    }
    match resolver.resolve(&path) {
        Ok(dims) => Probe::Found(dims),
        Err(e) => Probe::Failed {
            path,
            reason: e.to_string(),
        },
    }
}

/// Rewrite one document in memory.
pub fn annotate_text(
    text: &str,
    resolver: &impl DimensionResolver,
    image_base: &Path,
) -> markup::Rewrite {
    markup::rewrite_document(text, &mut |src: &str| {
        probe_source(resolver, image_base, src)
    })
}

/// Annotate one file, writing it back if it changed (and not a dry run).
pub fn annotate_file(
    path: &Path,
    resolver: &impl DimensionResolver,
    image_base: &Path,
    dry_run: bool,
) -> DocumentReport {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            return DocumentReport {
                path: path.to_path_buf(),
                status: DocumentStatus::ReadFailed(e.to_string()),
                events: Vec::new(),
            };
        }
    };

    let rewrite = annotate_text(&text, resolver, image_base);
    let status = if !rewrite.changed {
        DocumentStatus::Unchanged
    } else if dry_run {
        DocumentStatus::WouldUpdate
    } else {
        match fs::write(path, &rewrite.text) {
            Ok(()) => DocumentStatus::Updated,
            Err(e) => DocumentStatus::WriteFailed(e.to_string()),
        }
    };

    DocumentReport {
        path: path.to_path_buf(),
        status,
        events: rewrite.events,
    }
}

/// Annotate every Markdown file under `options.root` with the Rust backend.
pub fn annotate(options: &AnnotateOptions) -> Result<AnnotateSummary, AnnotateError> {
    annotate_with_backend(&RustBackend::new(), options)
}

/// Annotate using a specific resolver (allows testing with a mock).
pub fn annotate_with_backend(
    resolver: &impl DimensionResolver,
    options: &AnnotateOptions,
) -> Result<AnnotateSummary, AnnotateError> {
    if !options.root.is_dir() {
        return Err(AnnotateError::RootNotFound(options.root.clone()));
    }

    let documents = scan::markdown_files(&options.root, &options.extensions)
        .iter()
        .map(|path| annotate_file(path, resolver, &options.image_base, options.dry_run))
        .collect();

    Ok(AnnotateSummary { documents })
}
