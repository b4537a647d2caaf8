//! Image dimension lookup.
//!
//! - **Backend**: [`DimensionResolver`] trait + [`Dimensions`]
//! - **Rust backend**: [`RustBackend`], header reads via `image` and `avif-parse`

pub mod backend;
pub mod rust_backend;

pub use backend::{BackendError, DimensionResolver, Dimensions};
pub use rust_backend::RustBackend;
