//! Error types for the design canvas

use thiserror::Error;

/// Failures of design operations
#[derive(Debug, Error)]
pub enum DesignError {
    /// Uploaded bytes are not a decodable raster image
    #[error("unsupported image data: {0}")]
    Decode(String),

    /// Violation of the scene's base-layer invariant (a bug, never user input)
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
}

impl From<image::ImageError> for DesignError {
    fn from(err: image::ImageError) -> Self {
        DesignError::Decode(err.to_string())
    }
}

/// A color string that is not `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` or `transparent`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color: {0:?}")]
pub struct ColorParseError(pub String);
