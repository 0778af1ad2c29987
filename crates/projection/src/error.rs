//! Error types for projection construction.

use thiserror::Error;

/// Errors raised when projection parameters cannot define a valid projection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("invalid {projection} parameter '{param}': {reason}")]
    InvalidParameter {
        projection: &'static str,
        param: &'static str,
        reason: String,
    },
}

impl ProjectionError {
    /// Create an InvalidParameter error.
    pub fn invalid(projection: &'static str, param: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            projection,
            param,
            reason: reason.into(),
        }
    }
}

/// Result type for projection construction.
pub type Result<T> = std::result::Result<T, ProjectionError>;
