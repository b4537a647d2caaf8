//! Dimension resolver trait and shared types.
//!
//! The annotator only ever asks one question of an image: how big is it?
//! [`DimensionResolver`] captures that as a single method so the rewrite
//! logic can run against a mock in tests and against
//! [`RustBackend`](super::rust_backend::RustBackend) in production.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported image format: {0}")]
    Unsupported(String),
    #[error("Failed to read dimensions: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image file. Both values are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Build a `Dimensions`, rejecting zero-sized images.
    pub fn new(width: u32, height: u32) -> Result<Self, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "image reports empty size {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

/// Maps a local image file to its pixel dimensions.
///
/// Implementations must report every problem (unreadable file, unknown
/// format, corrupt header) as a [`BackendError`]; callers treat an error as
/// "leave this reference alone" and move on.
pub trait DimensionResolver {
    fn resolve(&self, path: &Path) -> Result<Dimensions, BackendError>;
}

impl<R: DimensionResolver + ?Sized> DimensionResolver for &R {
    fn resolve(&self, path: &Path) -> Result<Dimensions, BackendError> {
        (**self).resolve(path)
    }
}
