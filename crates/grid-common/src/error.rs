//! Error types for grid definition access.

use thiserror::Error;

/// Result type alias using GridDefinitionError.
pub type GridDefinitionResult<T> = Result<T, GridDefinitionError>;

/// Errors raised when a grid definition lacks or garbles a parameter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridDefinitionError {
    #[error("grid definition '{definition}' is missing parameter '{param}'")]
    MissingParameter { definition: String, param: String },

    #[error("grid definition '{definition}' has invalid value '{value}' for '{param}'")]
    InvalidParameter {
        definition: String,
        param: String,
        value: String,
    },
}

impl GridDefinitionError {
    /// Create a MissingParameter error.
    pub fn missing(definition: impl Into<String>, param: impl Into<String>) -> Self {
        Self::MissingParameter {
            definition: definition.into(),
            param: param.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid(
        definition: impl Into<String>,
        param: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            definition: definition.into(),
            param: param.into(),
            value: value.into(),
        }
    }
}
