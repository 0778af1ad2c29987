//! Error types for the grid-index crate.

use grid_common::GridDefinitionError;
use projection::ProjectionError;
use thiserror::Error;

/// Fatal synthesis errors.
///
/// Construction failures abort one horizontal group only; the synthesizer
/// records them as diagnostics and carries on with the other groups.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("unsupported projection type {projection} for grid definition {definition}")]
    UnsupportedProjection { definition: String, projection: String },

    #[error("bad grid definition {definition}: {reason}")]
    BadGridDefinition { definition: String, reason: String },

    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    #[error("grid definition error: {0}")]
    Definition(#[from] GridDefinitionError),

    #[error("{what} index {index} out of range (size {size})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        size: usize,
    },

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SynthesisError {
    pub fn bad_definition(definition: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadGridDefinition {
            definition: definition.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(definition: impl Into<String>, projection: impl Into<String>) -> Self {
        Self::UnsupportedProjection {
            definition: definition.into(),
            projection: projection.into(),
        }
    }

    pub fn out_of_range(what: &'static str, index: usize, size: usize) -> Self {
        Self::IndexOutOfRange { what, index, size }
    }
}

/// Result type for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthesisError>;
