//! Error types for canvas construction and configuration

use thiserror::Error;

/// Errors raised when a canvas is configured with unusable parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanvasError {
    /// Pixel ratio must be finite and positive
    #[error("invalid pixel ratio: {0} (must be finite and > 0)")]
    InvalidPixelRatio(f32),

    /// Tessellation tolerance must be finite and positive
    #[error("invalid tessellation tolerance: {0} (must be finite and > 0)")]
    InvalidTolerance(f32),

    /// Minimum arc segment distance must be finite and positive
    #[error("invalid minimum segment distance: {0} (must be finite and > 0)")]
    InvalidSegmentDistance(f32),

    /// Configuration document could not be parsed
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for prowl operations
pub type Result<T> = std::result::Result<T, CanvasError>;
