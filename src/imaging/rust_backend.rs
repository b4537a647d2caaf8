//! Pure Rust dimension resolver.
//!
//! Only headers are read; no pixel data is decoded.
//!
//! | Format | Crate / function |
//! |---|---|
//! | JPEG, PNG, GIF, TIFF, WebP | `image::image_dimensions` |
//! | AVIF | `avif-parse` container metadata |

use super::backend::{BackendError, DimensionResolver, Dimensions};
use image::ImageError;
use std::path::Path;

/// Resolver backed by the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn is_avif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("avif"))
}

/// Extract dimensions from an AVIF file's container metadata.
///
/// The `image` crate can only decode AVIF through a C library, so the
/// frame size is read from the `av1C`/`ispe` boxes instead.
fn identify_avif(path: &Path) -> Result<Dimensions, BackendError> {
    let file_data = std::fs::read(path)?;
    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(&file_data)).map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to parse AVIF {}: {e:?}", path.display()))
    })?;
    let meta = avif.primary_item_metadata().map_err(|e| {
        BackendError::ProcessingFailed(format!(
            "Failed to read AVIF metadata {}: {e:?}",
            path.display()
        ))
    })?;
    Dimensions::new(meta.max_frame_width.get(), meta.max_frame_height.get())
}

fn from_image_error(err: ImageError) -> BackendError {
    match err {
        ImageError::IoError(e) => BackendError::Io(e),
        ImageError::Unsupported(e) => BackendError::Unsupported(e.to_string()),
        other => BackendError::ProcessingFailed(other.to_string()),
    }
}

impl DimensionResolver for RustBackend {
    fn resolve(&self, path: &Path) -> Result<Dimensions, BackendError> {
        if is_avif(path) {
            return identify_avif(path);
        }
        let (width, height) = image::image_dimensions(path).map_err(from_image_error)?;
        Dimensions::new(width, height)
    }
}
