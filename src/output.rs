//! CLI output formatting for both jobs.
//!
//! Each job returns a summary; the `format_*` functions turn it into display
//! lines and the `print_*` wrappers write those lines to stdout. Format
//! functions are pure, so the exact wording is covered by unit tests.
//!
//! # Output Format
//!
//! ## Dimensions
//!
//! ```text
//! ==> Updating image dimensions in projects
//! Updated /pics/a.png in chair.md: 400x300
//! Warning: Image not found: /home/me/site/pics/gone.png (referenced in chair.md)
//! Converted MD image /img/cat.jpg in lamp.md to HTML with dims
//! Error reading dimensions for ./pics/b.heic: Unsupported image format: ...
//! ==> Done: 2 of 5 documents updated
//! ```
//!
//! ## Bundle
//!
//! ```text
//! ==> Bundling projects
//! Warning: key 'chair' from projects/2023/chair.md replaced by projects/2024/chair.md
//! ==> Wrote 4 documents to projects/projects-cache-static-export.js
//! ```

use crate::annotate::{AnnotateSummary, DocumentReport, DocumentStatus};
use crate::bundle::BundleReport;
use crate::markup::RewriteEvent;
use std::path::Path;

// ============================================================================
// Dimensions
// ============================================================================

pub fn format_annotate_header(root: &Path, dry_run: bool) -> String {
    let suffix = if dry_run { " (dry run)" } else { "" };
    format!("==> Updating image dimensions in {}{}", root.display(), suffix)
}

/// One line per rewrite event, attributed to the document's file name.
pub fn format_rewrite_event(event: &RewriteEvent, file_name: &str) -> String {
    match event {
        RewriteEvent::TagUpdated { src, width, height } => {
            format!("Updated {src} in {file_name}: {width}x{height}")
        }
        RewriteEvent::TagImageMissing { path } => format!(
            "Warning: Image not found: {} (referenced in {file_name})",
            path.display()
        ),
        RewriteEvent::LinkConverted { src, .. } => {
            format!("Converted MD image {src} in {file_name} to HTML with dims")
        }
        RewriteEvent::ProbeFailed { path, reason } => {
            format!("Error reading dimensions for {}: {reason}", path.display())
        }
    }
}

/// Event lines for one document, followed by any read/write failure.
pub fn format_document(report: &DocumentReport) -> Vec<String> {
    let file_name = report.file_name();
    let mut lines: Vec<String> = report
        .events
        .iter()
        .map(|e| format_rewrite_event(e, &file_name))
        .collect();

    match &report.status {
        DocumentStatus::ReadFailed(e) => {
            lines.push(format!("Error reading {}: {e}", report.path.display()))
        }
        DocumentStatus::WriteFailed(e) => {
            lines.push(format!("Error writing {}: {e}", report.path.display()))
        }
        DocumentStatus::WouldUpdate => {
            lines.push(format!("Would update {}", report.path.display()))
        }
        DocumentStatus::Unchanged | DocumentStatus::Updated => {}
    }
    lines
}

pub fn format_annotate_output(summary: &AnnotateSummary) -> Vec<String> {
    let mut lines: Vec<String> = summary.documents.iter().flat_map(format_document).collect();
    lines.push(format!(
        "==> Done: {} of {} documents updated",
        summary.updated_count(),
        summary.documents.len()
    ));
    lines
}

pub fn print_annotate_output(summary: &AnnotateSummary) {
    for line in format_annotate_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Bundle
// ============================================================================

pub fn format_bundle_output(report: &BundleReport) -> Vec<String> {
    let mut lines = Vec::new();
    if !report.source_found {
        lines.push(format!(
            "Warning: {} not found, writing an empty bundle",
            report.source.display()
        ));
    }
    for (path, e) in &report.unreadable {
        lines.push(format!("Error reading {}: {e}", path.display()));
    }
    for collision in &report.collisions {
        lines.push(format!(
            "Warning: key '{}' from {} replaced by {}",
            collision.key,
            collision.replaced.display(),
            collision.winner.display()
        ));
    }
    let noun = if report.table.len() == 1 {
        "document"
    } else {
        "documents"
    };
    lines.push(format!(
        "==> Wrote {} {} to {}",
        report.table.len(),
        noun,
        report.output.display()
    ));
    lines
}

pub fn print_bundle_output(report: &BundleReport) {
    for line in format_bundle_output(report) {
        println!("{}", line);
    }
}
