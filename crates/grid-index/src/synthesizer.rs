//! The synthesis orchestrator.
//!
//! One pass over the records: group them by grid definition, build each
//! horizontal coordinate system, collect variables, find or create their
//! vertical, time and ensemble coordinates, place every record in its
//! variable's tracker, then name everything and emit the schema.

use crate::config::SynthesisConfig;
use crate::dataset::{Dataset, HorizontalGroup};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::emit::reserved_names;
use crate::ensemble::{EnsembleKey, EnsembleRegistry};
use crate::error::{Result, SynthesisError};
use crate::horizontal::HorizontalCoordSys;
use crate::index::GridIndex;
use crate::naming::{assign_names, sanitize_group_name};
use crate::schema::SchemaBuilder;
use crate::time::{placement_order, TimeRegistry};
use crate::tracker::{Placement, RecordTracker};
use crate::variable::{CoordinateIds, GridVariable, VariableKey};
use crate::vertical::{HybridFactors, LevelSpec, VerticalRegistry};
use chrono::{DateTime, Utc};
use grid_common::{Attribute, TimeUnit};
use grid_record::{GridRecord, GridTableLookup};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cooperative cancellation, polled once per horizontal group and once per
/// variable.
pub trait CancelCheck {
    fn is_cancelled(&self) -> bool;
}

impl CancelCheck for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelCheck for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Builds a [`Dataset`] from a [`GridIndex`].
///
/// Each call to [`synthesize`](Self::synthesize) is an independent pass; the
/// synthesizer itself holds only the lookup and configuration.
#[derive(Clone)]
pub struct Synthesizer {
    lookup: Arc<dyn GridTableLookup>,
    config: SynthesisConfig,
}

/// Mutable state of one pass.
struct Pass<'a> {
    lookup: &'a dyn GridTableLookup,
    config: &'a SynthesisConfig,
    verticals: VerticalRegistry,
    times: TimeRegistry,
    ensembles: EnsembleRegistry,
    diagnostics: Diagnostics,
    groups: Vec<HorizontalGroup>,
    cancelled: bool,
}

impl Synthesizer {
    pub fn new(lookup: Arc<dyn GridTableLookup>, config: SynthesisConfig) -> Result<Self> {
        config.validate().map_err(SynthesisError::InvalidConfig)?;
        Ok(Self { lookup, config })
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn lookup(&self) -> &dyn GridTableLookup {
        self.lookup.as_ref()
    }

    pub fn synthesize(&self, index: &GridIndex) -> Dataset {
        self.synthesize_with_cancel(index, &NeverCancel)
    }

    pub fn synthesize_with_cancel(&self, index: &GridIndex, cancel: &dyn CancelCheck) -> Dataset {
        let lookup = self.lookup.as_ref();
        let mut pass = Pass {
            lookup,
            config: &self.config,
            verticals: VerticalRegistry::new(self.config.level_tolerance),
            times: TimeRegistry::new(),
            ensembles: EnsembleRegistry::new(),
            diagnostics: Diagnostics::new(),
            groups: Vec::new(),
            cancelled: false,
        };

        let definitions = index.definitions_by_key();
        let mut by_definition: BTreeMap<&str, Vec<&GridRecord>> = BTreeMap::new();
        for record in &index.records {
            by_definition
                .entry(record.grid_definition_id.as_str())
                .or_default()
                .push(record);
        }

        for (key, records) in by_definition {
            if cancel.is_cancelled() {
                pass.cancelled = true;
                break;
            }
            let Some(definition) = definitions.get(key) else {
                pass.diagnostics.push(Diagnostic::UnknownGridDefinition {
                    definition: key.to_string(),
                    records: records.len(),
                });
                continue;
            };
            match HorizontalCoordSys::build(definition, lookup, &self.config) {
                Ok(hcs) => pass.process_group(hcs, &records, cancel),
                Err(e) => pass.diagnostics.push(Diagnostic::HorizontalGroupFailed {
                    definition: key.to_string(),
                    reason: e.to_string(),
                    records: records.len(),
                }),
            }
            if pass.cancelled {
                break;
            }
        }

        pass.finish()
    }
}

impl Pass<'_> {
    fn process_group(&mut self, hcs: HorizontalCoordSys, records: &[&GridRecord], cancel: &dyn CancelCheck) {
        let group_index = self.groups.len();
        let mut variables: BTreeMap<VariableKey, GridVariable> = BTreeMap::new();
        for record in records {
            if record.valid_time().is_none() {
                self.diagnostics.push(Diagnostic::InvalidValidTime {
                    definition: record.grid_definition_id.clone(),
                    parameter: record.parameter,
                    offset: record.interval.map_or(record.valid_time_offset, |i| i.end),
                    unit: record.time_unit,
                });
                continue;
            }
            let key = VariableKey::of(record, self.lookup);
            variables
                .entry(key)
                .or_insert_with(|| GridVariable::new(key, group_index, record, self.lookup))
                .add_record((*record).clone());
        }
        debug!(
            definition = %hcs.key,
            records = records.len(),
            variables = variables.len(),
            "Collected variables"
        );

        let mut placed = Vec::with_capacity(variables.len());
        for (_, mut variable) in variables {
            if cancel.is_cancelled() {
                self.cancelled = true;
                break;
            }
            self.place_variable(&mut variable, &hcs);
            placed.push(variable);
        }

        self.groups.push(HorizontalGroup {
            hcs,
            name: None,
            variables: placed,
        });
    }

    /// Resolve the variable's coordinates and fill its tracker.
    ///
    /// Records are placed in [`placement_order`], so the occupant of a slot
    /// does not depend on input order.
    fn place_variable(&mut self, variable: &mut GridVariable, hcs: &HorizontalCoordSys) {
        let mut records = variable.take_records();
        records.sort_by(placement_order);
        let Some(first) = records.first() else {
            return;
        };
        let label = variable.label();
        let lookup = self.lookup;

        let spec = LevelSpec {
            level_name: lookup.level_name(first),
            description: lookup.level_description(first),
            units: lookup.level_unit(first),
            level_type: first.level_type1,
            positive_up: lookup.is_positive_up(first),
            use_vertical: lookup.is_vertical_coordinate(first),
            is_layer: variable.key.layer,
            is_hybrid: lookup.is_hybrid(first),
        };
        let is_hybrid = spec.is_hybrid;
        let (vertical_id, created) = self.verticals.find_or_create(spec, &records);
        if created && is_hybrid {
            let coord = self.verticals.get_mut(vertical_id);
            let factors = HybridFactors::from_packed(hcs.definition.vertical_coordinates(), coord.levels());
            coord.hybrid = factors;
        }

        let is_interval = records.iter().any(GridRecord::is_interval);
        let mut pending = Vec::new();
        let time = self
            .times
            .find_or_create(&label, &records, is_interval, &mut pending);
        for diagnostic in pending.drain(..) {
            self.diagnostics.push(diagnostic);
        }
        let Some((time_id, _)) = time else {
            return;
        };
        let ensemble_id = self
            .ensembles
            .find_or_create(&label, &records, &mut pending)
            .map(|(id, _)| id);
        for diagnostic in pending.drain(..) {
            self.diagnostics.push(diagnostic);
        }

        let vertical = self.verticals.get(vertical_id);
        let time = self.times.get(time_id);
        let ensemble = ensemble_id.map(|id| self.ensembles.get(id));
        let tolerance = self.verticals.tolerance();
        let mut tracker = RecordTracker::new(
            ensemble.map(|e| e.len()),
            time.len(),
            vertical.len(),
            time.is_mixed(),
        );

        let mut replaced = 0usize;
        let mut found = Vec::new();
        for record in records {
            let Some(level) = vertical.index_of(&record, tolerance) else {
                found.push(Diagnostic::LevelNotFound {
                    variable: label.clone(),
                    level1: record.level1,
                    level2: record.level2,
                });
                continue;
            };
            let Some(valid) = record.valid_time() else {
                continue;
            };
            let Ok(t) = time.times().binary_search(&valid) else {
                found.push(Diagnostic::TimeNotFound {
                    variable: label.clone(),
                    valid_time: valid,
                });
                continue;
            };
            let e = match ensemble {
                None => 0,
                Some(coord) => match coord.index_of(&record) {
                    Some(e) => e,
                    None => {
                        found.push(Diagnostic::EnsembleMemberNotFound {
                            variable: label.clone(),
                            member: EnsembleKey::of(&record),
                        });
                        continue;
                    }
                },
            };
            match tracker.assign(record, t, e, level) {
                Ok(Placement::Filled) => {}
                Ok(Placement::Replaced | Placement::Kept) => {
                    replaced += 1;
                    found.push(Diagnostic::SlotConflict {
                        variable: label.clone(),
                        time: t,
                        ensemble: e,
                        level,
                    });
                }
                Err(e) => warn!(variable = %label, error = %e, "Record slot out of range"),
            }
        }
        for diagnostic in found {
            self.diagnostics.push(diagnostic);
        }

        debug!(
            variable = %label,
            slots = tracker.len(),
            filled = tracker.filled(),
            conflicts = replaced,
            "Placed variable records"
        );
        variable.coordinates = Some(CoordinateIds {
            time: time_id,
            vertical: vertical_id,
            ensemble: ensemble_id,
        });
        variable.tracker = Some(tracker);
    }

    fn finish(mut self) -> Dataset {
        self.verticals.assign_dimension_names();
        self.times.assign_dimension_names();
        self.ensembles.assign_dimension_names();

        let use_description = self.config.use_description_for_variable_name;
        for group in &mut self.groups {
            let reserved = reserved_names(group, &self.verticals, &self.times, &self.ensembles);
            assign_names(&mut group.variables, &self.verticals, use_description, &reserved);
            for variable in &mut group.variables {
                if let Some(ids) = variable.coordinates {
                    let label = self.times.get(ids.time).interval_label();
                    variable.long_name = variable.make_long_name(label.as_deref());
                }
            }
        }

        if self.groups.len() > 1 {
            let mut used = HashSet::new();
            for group in &mut self.groups {
                group.name = Some(sanitize_group_name(&group.hcs.grid_name, &mut used));
            }
        }

        let attributes = self.global_attributes();
        let mut dataset = Dataset {
            schema: Default::default(),
            attributes,
            groups: self.groups,
            verticals: self.verticals,
            times: self.times,
            ensembles: self.ensembles,
            diagnostics: self.diagnostics.into_vec(),
            cancelled: self.cancelled,
            missing_value: self.lookup.missing_value(),
            format: self.lookup.format(),
            time_unit_name: self.lookup.time_range_unit_name(TimeUnit::Hour),
        };

        let mut builder = SchemaBuilder::new();
        dataset.emit(&mut builder);
        dataset.schema = builder.finish();

        info!(
            groups = dataset.groups.len(),
            variables = dataset.variable_names().len(),
            vertical_coordinates = dataset.verticals.len(),
            time_coordinates = dataset.times.len(),
            ensemble_coordinates = dataset.ensembles.len(),
            placed = dataset.placed_records(),
            dropped = dataset.dropped_records(),
            warnings = dataset.diagnostics.len(),
            cancelled = dataset.cancelled,
            "Synthesis complete"
        );
        dataset
    }

    fn run_date(&self) -> Option<DateTime<Utc>> {
        self.lookup
            .base_time()
            .or_else(|| self.times.iter().next().map(|t| t.reference_time))
    }

    fn global_attributes(&self) -> Vec<Attribute> {
        let grid_type = self.lookup.grid_type();
        let mut attrs = vec![
            Attribute::new("Conventions", self.config.conventions.clone()),
            Attribute::new("cdm_data_type", "GRID"),
            Attribute::new("file_format", grid_type),
            Attribute::new("history", format!("Direct read of {} into CDM model", grid_type)),
        ];
        if let Some(run) = self.run_date() {
            attrs.push(Attribute::new(
                "_CoordinateModelRunDate",
                run.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ));
        }
        let provenance = self.lookup.provenance();
        for (name, value) in [
            ("Originating_center", provenance.center),
            ("Generating_Process_or_Model", provenance.process),
            ("Product_Status", provenance.product_status),
            ("Product_Type", provenance.product_type),
        ] {
            if let Some(value) = value {
                attrs.push(Attribute::new(name, value));
            }
        }
        attrs
    }
}
