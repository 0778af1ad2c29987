//! Grid record model and format-specific lookup tables.
//!
//! Decoders turn each message of a gridded file into a [`GridRecord`]. The
//! [`GridTableLookup`] trait translates the numeric codes a record carries
//! into names, units and level semantics; [`TableLookup`] implements it for
//! GRIB-1 and GRIB-2 on top of [`GridTables`].

pub mod error;
pub mod lookup;
pub mod record;
pub mod tables;

pub use error::{RecordError, Result};
pub use lookup::{
    GridFormat, GridTableLookup, ProjectionType, Provenance, TableLookup, DEFAULT_MISSING_VALUE,
};
pub use record::{
    EnsembleMember, GridRecord, ParameterId, RecordLocation, StatisticType, TimeInterval,
    MISSING_LEVEL_TYPE,
};
pub use tables::{GridParameter, GridTables, LevelEntry};
