//! Common types and utilities shared across the grid indexing crates.

pub mod attribute;
pub mod error;
pub mod grid;
pub mod time;

pub use attribute::{Attribute, AttributeValue};
pub use error::{GridDefinitionError, GridDefinitionResult};
pub use grid::{keys, GridDefinition, ScanMode};
pub use time::{hours_between, valid_time_from_offset, TimeUnit};
