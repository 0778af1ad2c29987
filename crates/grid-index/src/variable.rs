//! Output variables and their identity keys.

use crate::ensemble::EnsembleId;
use crate::time::TimeId;
use crate::tracker::RecordTracker;
use crate::vertical::VerticalId;
use grid_record::{GridParameter, GridRecord, GridTableLookup, ParameterId, StatisticType};
use std::fmt;

/// Identity of an output variable within one horizontal group.
///
/// Records with the same parameter, level type, layer flag and statistic
/// belong to the same variable. Ordering is used for deterministic processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableKey {
    pub parameter: ParameterId,
    pub level_type: i32,
    pub layer: bool,
    /// Statistic code of interval records.
    pub statistic: Option<i32>,
}

impl VariableKey {
    pub fn of(record: &GridRecord, lookup: &dyn GridTableLookup) -> Self {
        Self {
            parameter: record.parameter,
            level_type: record.level_type1,
            layer: lookup.is_layer(record),
            statistic: record.interval.map(|i| i.statistic.code()),
        }
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_L{}", self.parameter, self.level_type)?;
        if self.layer {
            f.write_str("_layer")?;
        }
        if let Some(code) = self.statistic {
            write!(f, "_{}", StatisticType::from_code(code).suffix())?;
        }
        Ok(())
    }
}

/// Coordinates a variable resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateIds {
    pub time: TimeId,
    pub vertical: VerticalId,
    pub ensemble: Option<EnsembleId>,
}

/// One output variable of a horizontal group.
#[derive(Debug, Clone)]
pub struct GridVariable {
    pub key: VariableKey,
    /// Index of the owning horizontal group.
    pub group: usize,
    pub parameter: GridParameter,
    pub level_name: String,
    pub level_description: String,
    pub statistic: Option<StatisticType>,
    /// Records collected during the scan; released once the tracker is built.
    records: Vec<GridRecord>,
    pub coordinates: Option<CoordinateIds>,
    pub tracker: Option<RecordTracker>,
    /// Final name, unique within the group.
    pub name: String,
    pub long_name: String,
}

impl GridVariable {
    pub fn new(key: VariableKey, group: usize, first: &GridRecord, lookup: &dyn GridTableLookup) -> Self {
        Self {
            key,
            group,
            parameter: lookup.parameter(first),
            level_name: lookup.level_name(first),
            level_description: lookup.level_description(first),
            statistic: first.interval.map(|i| i.statistic),
            records: Vec::new(),
            coordinates: None,
            tracker: None,
            name: String::new(),
            long_name: String::new(),
        }
    }

    pub fn add_record(&mut self, record: GridRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[GridRecord] {
        &self.records
    }

    /// Hand the records over to the tracker builder.
    pub fn take_records(&mut self) -> Vec<GridRecord> {
        std::mem::take(&mut self.records)
    }

    /// Display key used in diagnostics and logs.
    pub fn label(&self) -> String {
        format!("{} ({})", self.parameter.description, self.key)
    }

    /// Name before disambiguation: the description or short name, made
    /// safe for use as an identifier.
    pub fn simple_name(&self, use_description: bool) -> String {
        let raw = if use_description {
            &self.parameter.description
        } else {
            &self.parameter.name
        };
        sanitize_name(raw)
    }

    /// `description[ (Statistic for <label>)] @ level description`.
    pub fn make_long_name(&self, interval_label: Option<&str>) -> String {
        let mut long_name = self.parameter.description.clone();
        if let (Some(stat), Some(label)) = (self.statistic, interval_label) {
            long_name.push_str(&format!(" ({} for {})", stat.name(), label));
        }
        if !self.level_description.is_empty() {
            long_name.push_str(" @ ");
            long_name.push_str(&self.level_description);
        }
        long_name
    }
}

/// Replace characters that are not valid in variable names with underscores.
pub fn sanitize_name(raw: &str) -> String {
    let mut name: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '+' | '@') {
                c
            } else {
                '_'
            }
        })
        .collect();
    while name.contains("__") {
        name = name.replace("__", "_");
    }
    let trimmed = name.trim_matches('_');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}
