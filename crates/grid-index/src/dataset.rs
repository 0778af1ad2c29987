//! The synthesized dataset and its random-access read path.

use crate::diagnostic::Diagnostic;
use crate::ensemble::{EnsembleId, EnsembleRegistry};
use crate::error::{Result, SynthesisError};
use crate::horizontal::HorizontalCoordSys;
use crate::schema::{DatasetSchema, VariableHandle};
use crate::time::{TimeId, TimeRegistry};
use crate::variable::GridVariable;
use crate::vertical::{VerticalId, VerticalRegistry};
use grid_common::Attribute;
use grid_record::{GridFormat, GridRecord};
use std::collections::BTreeSet;
use std::ops::Range;

/// One horizontal grid and the variables defined on it.
#[derive(Debug, Clone)]
pub struct HorizontalGroup {
    pub hcs: HorizontalCoordSys,
    /// Group name in the schema; `None` when emitted into the root.
    pub name: Option<String>,
    /// Variables in key order.
    pub variables: Vec<GridVariable>,
}

impl HorizontalGroup {
    /// Variables that received coordinates and a tracker.
    pub fn placed_variables(&self) -> impl Iterator<Item = (usize, &GridVariable)> {
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.coordinates.is_some() && v.tracker.is_some())
    }

    /// Coordinates referenced by the placed variables.
    pub fn coordinates(&self) -> GroupCoordinates {
        let mut coords = GroupCoordinates::default();
        for (_, var) in self.placed_variables() {
            if let Some(ids) = var.coordinates {
                coords.times.insert(ids.time);
                coords.verticals.insert(ids.vertical);
                if let Some(ens) = ids.ensemble {
                    coords.ensembles.insert(ens);
                }
            }
        }
        coords
    }
}

/// Coordinate ids used within one group, in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCoordinates {
    pub times: BTreeSet<TimeId>,
    pub verticals: BTreeSet<VerticalId>,
    pub ensembles: BTreeSet<EnsembleId>,
}

/// Outcome of a slot read.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotRead<'a> {
    /// Decode this record and subset it to the requested rectangle.
    Record(&'a GridRecord),
    /// No record occupies the slot; fill the rectangle.
    Missing { fill: f32, shape: (usize, usize) },
}

impl SlotRead<'_> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }

    pub fn record(&self) -> Option<&GridRecord> {
        match self {
            Self::Record(record) => Some(record),
            Self::Missing { .. } => None,
        }
    }

    /// Row-major fill buffer for a missing slot.
    pub fn fill_buffer(&self) -> Option<Vec<f32>> {
        match self {
            Self::Missing { fill, shape } => Some(vec![*fill; shape.0 * shape.1]),
            Self::Record(_) => None,
        }
    }
}

/// Result of a synthesis pass.
///
/// Immutable once returned. A cancelled pass returns the partial structure
/// built so far with `cancelled` set; callers must discard it.
#[derive(Debug)]
pub struct Dataset {
    pub schema: DatasetSchema,
    pub attributes: Vec<Attribute>,
    pub groups: Vec<HorizontalGroup>,
    pub verticals: VerticalRegistry,
    pub times: TimeRegistry,
    pub ensembles: EnsembleRegistry,
    pub diagnostics: Vec<Diagnostic>,
    pub cancelled: bool,
    pub missing_value: f32,
    pub format: GridFormat,
    /// Unit name used in time coordinate units.
    pub time_unit_name: String,
}

impl Dataset {
    /// Handle of a data variable by group and name. `None` selects the root.
    pub fn find_variable(&self, group: Option<&str>, name: &str) -> Result<VariableHandle> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.name.as_deref() == group)
            .find_map(|(gi, g)| {
                g.placed_variables()
                    .find(|(_, v)| v.name == name)
                    .map(|(vi, _)| VariableHandle { group: gi, variable: vi })
            })
            .ok_or_else(|| match group {
                Some(group) => SynthesisError::UnknownVariable(format!("{}/{}", group, name)),
                None => SynthesisError::UnknownVariable(name.to_string()),
            })
    }

    pub fn variable(&self, handle: VariableHandle) -> Option<&GridVariable> {
        self.groups.get(handle.group)?.variables.get(handle.variable)
    }

    /// All data variable names, grouped by horizontal group.
    pub fn variable_names(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| g.placed_variables().map(|(_, v)| v.name.clone()))
            .collect()
    }

    /// Number of records occupying a slot.
    pub fn placed_records(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.variables.iter())
            .filter_map(|v| v.tracker.as_ref())
            .map(|t| t.filled())
            .sum()
    }

    /// Records skipped because of a diagnostic.
    pub fn dropped_records(&self) -> usize {
        self.diagnostics
            .iter()
            .map(|d| match d {
                Diagnostic::UnknownGridDefinition { records, .. }
                | Diagnostic::HorizontalGroupFailed { records, .. } => *records,
                other if other.drops_record() => 1,
                _ => 0,
            })
            .sum()
    }

    /// Resolve one slot of a data variable.
    ///
    /// Indices must lie within the variable's coordinates (`ensemble` must be
    /// 0 without an ensemble axis) and the ranges within the horizontal grid.
    pub fn read_slot(
        &self,
        handle: VariableHandle,
        time: usize,
        ensemble: usize,
        level: usize,
        y_range: Range<usize>,
        x_range: Range<usize>,
    ) -> Result<SlotRead<'_>> {
        let group = self
            .groups
            .get(handle.group)
            .ok_or_else(|| SynthesisError::out_of_range("group", handle.group, self.groups.len()))?;
        let variable = group.variables.get(handle.variable).ok_or_else(|| {
            SynthesisError::out_of_range("variable", handle.variable, group.variables.len())
        })?;
        let tracker = variable
            .tracker
            .as_ref()
            .ok_or_else(|| SynthesisError::UnknownVariable(variable.label()))?;

        check_range("y", &y_range, group.hcs.ny())?;
        check_range("x", &x_range, group.hcs.nx())?;

        let slot = tracker.slot(time, ensemble, level)?;
        Ok(match tracker.at(slot) {
            Some(record) => SlotRead::Record(record),
            None => SlotRead::Missing {
                fill: self.missing_value,
                shape: (y_range.len(), x_range.len()),
            },
        })
    }
}

fn check_range(what: &'static str, range: &Range<usize>, size: usize) -> Result<()> {
    if range.start > range.end {
        return Err(SynthesisError::out_of_range(what, range.start, range.end));
    }
    if range.end > size {
        return Err(SynthesisError::out_of_range(what, range.end, size));
    }
    Ok(())
}
