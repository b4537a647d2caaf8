//! Filename handling for Markdown documents.
//!
//! A document is recognized by its extension (case-insensitive, from the
//! configured list) and keyed by its filename with that extension removed:
//! - `projects/chair.md` → `chair`
//! - `projects/2024/chair.md` → `chair` (same key; later file wins in a bundle)
//! - `projects/notes.v2.md` → `notes.v2`
//! - `projects/README.MD` → `README`
//! - `projects/draft.mdx` → not a document

use std::path::Path;

/// Whether `path` has one of the given extensions (no leading dot).
pub fn has_markdown_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}

/// Derive a bundle key from a document path.
///
/// Returns `None` when the path is not a recognized Markdown document.
pub fn document_key(path: &Path, extensions: &[String]) -> Option<String> {
    if !has_markdown_extension(path, extensions) {
        return None;
    }
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
