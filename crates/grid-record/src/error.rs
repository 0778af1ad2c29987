//! Error types for the record model.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// Format name not recognised.
    #[error("unknown grid format: {0}")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, RecordError>;
