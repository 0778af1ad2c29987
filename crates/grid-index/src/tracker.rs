//! The record tracker: a flat slot array over (ensemble, time, level).

use crate::error::{Result, SynthesisError};
use grid_record::GridRecord;

/// Outcome of placing a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The slot was empty.
    Filled,
    /// The incoming record replaced the occupant.
    Replaced,
    /// The occupant stayed and the incoming record was discarded.
    Kept,
}

/// Maps each (ensemble, time, level) slot to the record occupying it.
///
/// Slots are laid out ensemble-major: `ens * (n_times * n_levels) + time * n_levels + level`.
#[derive(Debug, Clone)]
pub struct RecordTracker {
    n_ensembles: Option<usize>,
    n_times: usize,
    n_levels: usize,
    mixed_intervals: bool,
    slots: Vec<Option<GridRecord>>,
}

impl RecordTracker {
    /// `n_ensembles` is `None` when the variable has no ensemble axis.
    pub fn new(
        n_ensembles: Option<usize>,
        n_times: usize,
        n_levels: usize,
        mixed_intervals: bool,
    ) -> Self {
        let len = n_ensembles.unwrap_or(1) * n_times * n_levels;
        Self {
            n_ensembles,
            n_times,
            n_levels,
            mixed_intervals,
            slots: vec![None; len],
        }
    }

    pub fn n_times(&self) -> usize {
        self.n_times
    }

    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    pub fn n_ensembles(&self) -> Option<usize> {
        self.n_ensembles
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of occupied slots.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Flat slot of a (time, ensemble, level) tuple.
    pub fn slot(&self, time: usize, ensemble: usize, level: usize) -> Result<usize> {
        if time >= self.n_times {
            return Err(SynthesisError::out_of_range("time", time, self.n_times));
        }
        if level >= self.n_levels {
            return Err(SynthesisError::out_of_range("level", level, self.n_levels));
        }
        match self.n_ensembles {
            Some(n_ens) => {
                if ensemble >= n_ens {
                    return Err(SynthesisError::out_of_range("ensemble", ensemble, n_ens));
                }
                Ok(ensemble * (self.n_times * self.n_levels) + time * self.n_levels + level)
            }
            None => {
                if ensemble != 0 {
                    return Err(SynthesisError::out_of_range("ensemble", ensemble, 1));
                }
                Ok(time * self.n_levels + level)
            }
        }
    }

    /// Place a record, resolving conflicts with any occupant.
    ///
    /// 1. Mixed-interval coordinate with an interval occupant: the incoming
    ///    record replaces it only when its interval starts at zero.
    /// 2. Interval occupant: the narrower interval stays; ties keep the occupant.
    /// 3. Otherwise the incoming record replaces the occupant.
    pub fn assign(
        &mut self,
        record: GridRecord,
        time: usize,
        ensemble: usize,
        level: usize,
    ) -> Result<Placement> {
        let slot = self.slot(time, ensemble, level)?;
        let mixed = self.mixed_intervals;
        let entry = &mut self.slots[slot];

        let placement = match entry {
            None => Placement::Filled,
            Some(occupant) if mixed && occupant.is_interval() => {
                if record.interval_start() == 0 {
                    Placement::Replaced
                } else {
                    Placement::Kept
                }
            }
            Some(occupant) if occupant.is_interval() => {
                if record.interval_width() < occupant.interval_width() {
                    Placement::Replaced
                } else {
                    Placement::Kept
                }
            }
            Some(_) => Placement::Replaced,
        };

        if placement != Placement::Kept {
            *entry = Some(record);
        }
        Ok(placement)
    }

    /// The record in a slot, `None` when missing or out of range.
    pub fn find(&self, time: usize, ensemble: usize, level: usize) -> Option<&GridRecord> {
        let slot = self.slot(time, ensemble, level).ok()?;
        self.slots[slot].as_ref()
    }

    /// The record at a flat slot.
    pub fn at(&self, slot: usize) -> Option<&GridRecord> {
        self.slots.get(slot).and_then(Option::as_ref)
    }
}
