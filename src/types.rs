//! Shared types used by both jobs.

use std::path::PathBuf;

/// A Markdown file read from the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDocument {
    /// Path as found during traversal (root-relative paths stay relative).
    pub path: PathBuf,
    /// Filename with the Markdown extension stripped, e.g. `chair` for
    /// `projects/furniture/chair.md`. Not unique across directories.
    pub key: String,
    /// Raw file contents.
    pub content: String,
}
