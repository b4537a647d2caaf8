//! Content tree traversal.
//!
//! Both jobs walk the same kind of tree:
//!
//! ```text
//! projects/
//! ├── chair.md                 # visited 1st
//! ├── lamp.md                  # visited 2nd
//! ├── 2023/
//! │   └── stool.md             # visited 3rd
//! └── 2024/
//!     ├── chair.md             # visited 4th (same key as the 1st)
//!     └── pics/
//!         └── chair.jpg        # not Markdown, ignored
//! ```
//!
//! Within a directory, files come before subdirectories and each group is
//! ordered by file name. This order is stable across platforms and is what
//! "the later file wins" means for bundle key collisions.

use crate::naming::{document_key, has_markdown_extension};
use crate::types::ContentDocument;
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn files_then_dirs(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// All Markdown files under `root`, in traversal order.
///
/// A missing or unreadable `root`, or one that is a file, yields an empty
/// list; entries that can't be read are skipped.
pub fn markdown_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by(files_then_dirs)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && has_markdown_extension(p, extensions))
        .collect()
}

/// Read one document and derive its key.
pub fn read_document(path: &Path, extensions: &[String]) -> io::Result<ContentDocument> {
    let content = fs::read_to_string(path)?;
    let key = document_key(path, extensions).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a Markdown document: {}", path.display()),
        )
    })?;
    Ok(ContentDocument {
        path: path.to_path_buf(),
        key,
        content,
    })
}
