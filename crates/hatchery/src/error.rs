//! Error types for hatchery.
//!
//! ## Rust Lesson #20: Error Handling
//!
//! Rust uses `Result<T, E>` instead of exceptions. `thiserror` derives the
//! `Display` and `std::error::Error` boilerplate from the `#[error(...)]`
//! attributes, so each variant reads like the message it prints.

use thiserror::Error;

/// Errors produced by the geometry engine and exporter.
///
/// Numerical degeneracy (parallel segments, zero-length edges) is never an
/// error: those cases resolve to "no intersection".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A shape tag that names none of the known shape variants.
    #[error("unsupported shape type: {0:?}")]
    UnsupportedShapeType(String),

    /// Size must be positive and finite.
    #[error("invalid shape size {0}: must be positive and finite")]
    InvalidSize(f64),

    /// The XML writer failed while building an SVG document.
    #[error("SVG write error: {0}")]
    Svg(String),
}

/// Result type for hatchery operations.
pub type Result<T> = std::result::Result<T, GeometryError>;
