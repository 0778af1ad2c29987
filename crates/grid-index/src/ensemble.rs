//! Ensemble coordinates.
//!
//! Records of one variable are grouped into product slices: same parameter,
//! both level pairs and valid time. Every member of the coordinate is
//! expected once per slice; slices with fewer members leave missing slots
//! and are reported.

use crate::diagnostic::Diagnostic;
use grid_record::{GridRecord, ParameterId};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Index of an ensemble coordinate in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnsembleId(pub usize);

/// Typed identity of one ensemble member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EnsembleKey {
    /// Perturbation type.
    pub kind: i32,
    pub number: i32,
}

impl EnsembleKey {
    pub fn of(record: &GridRecord) -> Option<Self> {
        record.ensemble.map(|m| Self {
            kind: m.kind,
            number: m.number,
        })
    }
}

impl fmt::Display for EnsembleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.number)
    }
}

/// Records that describe the same product slice; each one is a different member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CompositeKey {
    parameter: ParameterId,
    level_type1: i32,
    level1: u64,
    level_type2: i32,
    level2: u64,
    valid_time: Option<i64>,
}

impl CompositeKey {
    fn of(record: &GridRecord) -> Self {
        Self {
            parameter: record.parameter,
            level_type1: record.level_type1,
            level1: (record.level1 + 0.0).to_bits(),
            level_type2: record.level_type2,
            level2: (record.level2 + 0.0).to_bits(),
            valid_time: record.valid_time().map(|t| t.timestamp_millis()),
        }
    }
}

/// A deduplicated ensemble axis.
#[derive(Debug, Clone)]
pub struct EnsembleCoord {
    pub id: EnsembleId,
    /// Member keys, sorted.
    members: Vec<EnsembleKey>,
    /// Dimension name, assigned after all coordinates exist.
    pub dimension: String,
}

impl EnsembleCoord {
    pub fn members(&self) -> &[EnsembleKey] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn index_of(&self, record: &GridRecord) -> Option<usize> {
        let key = EnsembleKey::of(record)?;
        self.members.binary_search(&key).ok()
    }
}

/// Find-or-create registry for ensemble coordinates.
#[derive(Debug, Default)]
pub struct EnsembleRegistry {
    coords: Vec<EnsembleCoord>,
    by_count: HashMap<usize, Vec<EnsembleId>>,
}

impl EnsembleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse a coordinate with the same members, or create one.
    ///
    /// The members are the distinct [`EnsembleKey`]s of the records. A slice
    /// holding fewer of them than that yields one
    /// [`Diagnostic::IncompleteEnsembleSlices`] for the variable. Returns
    /// `None` when no record carries ensemble membership.
    pub fn find_or_create<'a>(
        &mut self,
        variable: &str,
        records: impl IntoIterator<Item = &'a GridRecord>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<(EnsembleId, bool)> {
        let mut members = BTreeSet::new();
        let mut slices: HashMap<CompositeKey, HashSet<EnsembleKey>> = HashMap::new();
        for record in records {
            if let Some(key) = EnsembleKey::of(record) {
                members.insert(key);
                slices.entry(CompositeKey::of(record)).or_default().insert(key);
            }
        }
        if members.is_empty() {
            return None;
        }
        let members: Vec<EnsembleKey> = members.into_iter().collect();

        let incomplete = slices.values().filter(|s| s.len() < members.len()).count();
        if incomplete > 0 {
            diagnostics.push(Diagnostic::IncompleteEnsembleSlices {
                variable: variable.to_string(),
                members: members.len(),
                slices: slices.len(),
                incomplete,
            });
        }

        if let Some(ids) = self.by_count.get(&members.len()) {
            if let Some(id) = ids.iter().find(|id| self.coords[id.0].members == members) {
                debug!(variable = %variable, id = id.0, "Reusing ensemble coordinate");
                return Some((*id, false));
            }
        }

        let id = EnsembleId(self.coords.len());
        debug!(
            variable = %variable,
            id = id.0,
            members = members.len(),
            slices = slices.len(),
            "Created ensemble coordinate"
        );
        self.by_count.entry(members.len()).or_default().push(id);
        self.coords.push(EnsembleCoord {
            id,
            members,
            dimension: "ens".to_string(),
        });
        Some((id, true))
    }

    pub fn get(&self, id: EnsembleId) -> &EnsembleCoord {
        &self.coords[id.0]
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// `ens`, `ens1`, `ens2` ... in creation order.
    pub fn assign_dimension_names(&mut self) {
        for (i, coord) in self.coords.iter_mut().enumerate() {
            coord.dimension = if i == 0 {
                "ens".to_string()
            } else {
                format!("ens{}", i)
            };
        }
    }

    pub fn into_vec(self) -> Vec<EnsembleCoord> {
        self.coords
    }
}
