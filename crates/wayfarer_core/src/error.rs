//! Error types for wayfarer_core.
//!
//! Only conditions a caller can act on are errors. Out-of-bounds field
//! queries, missing paths and stuck agents are ordinary outcomes and never
//! show up here.

use thiserror::Error;
use wayfarer_data::LayoutError;

/// Main error type for wayfarer_core operations.
#[derive(Error, Debug)]
pub enum NavError {
    /// Forward pass was handed a sensory vector of the wrong width
    #[error("Shape mismatch: expected {expected} inputs, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Controller produced a motor vector of the wrong width
    #[error("Output mismatch: expected {expected} outputs, got {actual}")]
    OutputMismatch { expected: usize, actual: usize },

    /// Externally supplied genome does not satisfy its layout invariants
    #[error("Invalid genome: {0}")]
    InvalidGenome(#[from] LayoutError),

    /// Encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<NavError>,
    },
}

/// Result type alias for wayfarer_core operations.
pub type Result<T> = std::result::Result<T, NavError>;

impl NavError {
    /// Creates a new shape mismatch error.
    #[must_use]
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Creates a new serialization error.
    #[must_use]
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NavError::shape_mismatch(31, 30);
        assert_eq!(
            err.to_string(),
            "Shape mismatch: expected 31 inputs, got 30"
        );
    }

    #[test]
    fn test_error_context() {
        let err = NavError::serialization("truncated").with_context("decoding genome");
        assert!(err.to_string().contains("decoding genome"));
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_from_layout_error() {
        let err: NavError = LayoutError::TooFewLayers(2).into();
        assert!(matches!(err, NavError::InvalidGenome(_)));
    }
}
