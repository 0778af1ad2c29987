//! Non-fatal consistency problems found during synthesis.

use crate::ensemble::EnsembleKey;
use chrono::{DateTime, Utc};
use grid_common::TimeUnit;
use grid_record::ParameterId;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// A problem that dropped or flagged records without stopping synthesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Records reference a grid definition that is not in the index.
    UnknownGridDefinition { definition: String, records: usize },
    /// A record's reference time differs from the one its time coordinate uses.
    ReferenceTimeMismatch {
        variable: String,
        expected: DateTime<Utc>,
        found: DateTime<Utc>,
    },
    /// A record's time unit differs from the one its time coordinate uses.
    TimeUnitMismatch {
        variable: String,
        expected: TimeUnit,
        found: TimeUnit,
    },
    /// A record's level is not a value of the variable's vertical coordinate.
    LevelNotFound {
        variable: String,
        level1: f64,
        level2: f64,
    },
    /// A record's valid time is not a value of the variable's time coordinate.
    TimeNotFound {
        variable: String,
        valid_time: DateTime<Utc>,
    },
    /// A record's ensemble member is not in the variable's ensemble coordinate.
    EnsembleMemberNotFound {
        variable: String,
        member: Option<EnsembleKey>,
    },
    /// A record's forecast offset puts its valid time outside the representable range.
    InvalidValidTime {
        definition: String,
        parameter: ParameterId,
        offset: i32,
        unit: TimeUnit,
    },
    /// Two records of a variable mapped to the same slot; one of them was discarded.
    SlotConflict {
        variable: String,
        time: usize,
        ensemble: usize,
        level: usize,
    },
    /// Some product slices of an ensemble variable lack members; their slots stay missing.
    IncompleteEnsembleSlices {
        variable: String,
        members: usize,
        slices: usize,
        incomplete: usize,
    },
    /// A horizontal group could not be built; its records were dropped.
    HorizontalGroupFailed {
        definition: String,
        reason: String,
        records: usize,
    },
}

impl Diagnostic {
    /// True when the record involved was skipped.
    pub fn drops_record(&self) -> bool {
        !matches!(
            self,
            Self::ReferenceTimeMismatch { .. }
                | Self::TimeUnitMismatch { .. }
                | Self::IncompleteEnsembleSlices { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGridDefinition { definition, records } => write!(
                f,
                "{} records reference unknown grid definition {}",
                records, definition
            ),
            Self::ReferenceTimeMismatch {
                variable,
                expected,
                found,
            } => write!(
                f,
                "{}: reference time {} differs from {}",
                variable,
                found.to_rfc3339(),
                expected.to_rfc3339()
            ),
            Self::TimeUnitMismatch {
                variable,
                expected,
                found,
            } => write!(f, "{}: time unit {} differs from {}", variable, found, expected),
            Self::LevelNotFound {
                variable,
                level1,
                level2,
            } => write!(f, "{}: level ({}, {}) not found", variable, level1, level2),
            Self::TimeNotFound {
                variable,
                valid_time,
            } => write!(f, "{}: valid time {} not found", variable, valid_time.to_rfc3339()),
            Self::EnsembleMemberNotFound { variable, member } => match member {
                Some(key) => write!(f, "{}: ensemble member {} not found", variable, key),
                None => write!(f, "{}: record has no ensemble member", variable),
            },
            Self::InvalidValidTime {
                definition,
                parameter,
                offset,
                unit,
            } => write!(
                f,
                "{} on {}: forecast offset {} {} has no valid time",
                parameter, definition, offset, unit
            ),
            Self::SlotConflict {
                variable,
                time,
                ensemble,
                level,
            } => write!(
                f,
                "{}: duplicate record for slot (time {}, ens {}, level {})",
                variable, time, ensemble, level
            ),
            Self::IncompleteEnsembleSlices {
                variable,
                members,
                slices,
                incomplete,
            } => write!(
                f,
                "{}: {} of {} slices have fewer than {} members",
                variable, incomplete, slices, members
            ),
            Self::HorizontalGroupFailed {
                definition,
                reason,
                records,
            } => write!(
                f,
                "grid definition {} failed ({}), {} records dropped",
                definition, reason, records
            ),
        }
    }
}

/// Collects diagnostics and logs each one as it arrives.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!(
            dropped = diagnostic.drops_record(),
            detail = %diagnostic,
            "Synthesis consistency warning"
        );
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
