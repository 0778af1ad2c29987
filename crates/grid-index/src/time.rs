//! Time coordinates and their dedup registry.
//!
//! A time coordinate is either a sorted set of point valid times or, for
//! statistically processed records, a set of (valid time, start, length)
//! interval triples. Cells of an interval coordinate are its distinct valid
//! times; records ending at the same time share a cell and the record
//! tracker decides which one occupies it.

use crate::diagnostic::Diagnostic;
use chrono::{DateTime, Utc};
use grid_common::{hours_between, TimeUnit};
use grid_record::GridRecord;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Index of a time coordinate in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeId(pub usize);

/// One statistically processed span, offsets in hours from the reference time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalTriple {
    pub valid_time: DateTime<Utc>,
    pub start: f64,
    pub length: f64,
}

impl IntervalTriple {
    /// `None` when the record has no representable valid time.
    pub fn from_record(record: &GridRecord) -> Option<Self> {
        let factor = record.time_unit.hours_factor();
        Some(Self {
            valid_time: record.valid_time()?,
            start: record.interval_start() as f64 * factor,
            length: record.interval_width() as f64 * factor,
        })
    }
}

/// Interval start in hours, zero for point records.
fn start_hours(record: &GridRecord) -> f64 {
    record
        .interval
        .map(|i| i.start as f64 * record.time_unit.hours_factor())
        .unwrap_or(0.0)
}

/// Order in which a variable's records are offered to its tracker.
///
/// Valid time first, then interval start. Within a cell of a mixed
/// coordinate the earliest-starting interval arrives first, so the tracker's
/// occupant, and with it [`TimeCoord::bounds`], does not depend on input
/// order. The sort is stable: duplicate point records keep their input order.
pub fn placement_order(a: &GridRecord, b: &GridRecord) -> Ordering {
    a.valid_time()
        .cmp(&b.valid_time())
        .then(start_hours(a).total_cmp(&start_hours(b)))
}

/// Exact canonical form of a time coordinate, used as the registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TimeKey {
    Points(Vec<i64>),
    Intervals(Vec<(i64, u64, u64)>),
}

/// Bits of a float with negative zero folded into zero.
fn canonical_bits(v: f64) -> u64 {
    (v + 0.0).to_bits()
}

impl TimeKey {
    fn points(times: &[DateTime<Utc>]) -> Self {
        Self::Points(times.iter().map(|t| t.timestamp_millis()).collect())
    }

    fn intervals(triples: &[IntervalTriple]) -> Self {
        Self::Intervals(
            triples
                .iter()
                .map(|t| {
                    (
                        t.valid_time.timestamp_millis(),
                        canonical_bits(t.start),
                        canonical_bits(t.length),
                    )
                })
                .collect(),
        )
    }
}

/// A deduplicated time coordinate.
#[derive(Debug, Clone)]
pub struct TimeCoord {
    pub id: TimeId,
    pub reference_time: DateTime<Utc>,
    pub unit: TimeUnit,
    /// Distinct valid times, ascending. One cell each.
    times: Vec<DateTime<Utc>>,
    /// Sorted interval triples; empty for point coordinates.
    triples: Vec<IntervalTriple>,
    is_interval: bool,
    /// Shared non-zero interval length in hours, `None` when lengths differ.
    constant_interval: Option<f64>,
    /// Dimension name, assigned after all coordinates exist.
    pub dimension: String,
}

impl TimeCoord {
    pub fn is_interval(&self) -> bool {
        self.is_interval
    }

    /// Interval coordinate whose non-zero lengths differ.
    pub fn is_mixed(&self) -> bool {
        self.is_interval && self.constant_interval.is_none()
    }

    pub fn constant_interval(&self) -> Option<f64> {
        self.constant_interval
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn triples(&self) -> &[IntervalTriple] {
        &self.triples
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Cell values in hours since the reference time.
    pub fn values(&self) -> Vec<f64> {
        self.times
            .iter()
            .map(|t| hours_between(self.reference_time, *t))
            .collect()
    }

    /// `(start, end)` bounds per cell in hours since the reference time.
    ///
    /// When several intervals end in one cell the bounds describe the record
    /// the tracker keeps when fed in [`placement_order`]: a mixed coordinate
    /// keeps the interval starting at zero, else the first to arrive, which
    /// is the earliest start; a constant coordinate keeps the shortest.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.times
            .iter()
            .map(|t| {
                let end = hours_between(self.reference_time, *t);
                let mut candidates = self.triples.iter().filter(|tr| tr.valid_time == *t);
                let chosen = if self.is_mixed() {
                    let first = candidates.clone().min_by(|a, b| a.start.total_cmp(&b.start));
                    candidates.find(|tr| tr.start == 0.0).or(first)
                } else {
                    shortest(candidates)
                };
                let length = chosen.map(|tr| tr.length).unwrap_or(0.0);
                (end - length, end)
            })
            .collect()
    }

    /// Label for interval variables: `"6 Hour Intervals"` or `"Mixed Intervals"`.
    pub fn interval_label(&self) -> Option<String> {
        if !self.is_interval {
            return None;
        }
        Some(match self.constant_interval {
            Some(length) => format!("{} Hour Intervals", length),
            None => "Mixed Intervals".to_string(),
        })
    }

    /// Cell of a record's valid time.
    pub fn index_of(&self, record: &GridRecord) -> Option<usize> {
        let valid = record.valid_time()?;
        self.times.binary_search(&valid).ok()
    }
}

fn shortest<'a>(triples: impl Iterator<Item = &'a IntervalTriple>) -> Option<&'a IntervalTriple> {
    triples.min_by(|a, b| a.length.total_cmp(&b.length))
}

/// Find-or-create registry for time coordinates.
#[derive(Debug, Default)]
pub struct TimeRegistry {
    coords: Vec<TimeCoord>,
    index: HashMap<TimeKey, TimeId>,
}

impl TimeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse a coordinate with the same kind and value set, or create one.
    ///
    /// The first record fixes the reference time and unit; disagreeing
    /// records produce diagnostics but still contribute their valid times.
    /// Records without a representable valid time are ignored.
    pub fn find_or_create<'a, I>(
        &mut self,
        variable: &str,
        records: I,
        is_interval: bool,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<(TimeId, bool)>
    where
        I: IntoIterator<Item = &'a GridRecord>,
    {
        let mut reference: Option<(DateTime<Utc>, TimeUnit)> = None;
        let mut times: Vec<DateTime<Utc>> = Vec::new();
        let mut triples: Vec<IntervalTriple> = Vec::new();

        for record in records {
            let Some(valid) = record.valid_time() else {
                continue;
            };
            match reference {
                None => reference = Some((record.reference_time, record.time_unit)),
                Some((ref_time, unit)) => {
                    if record.reference_time != ref_time {
                        diagnostics.push(Diagnostic::ReferenceTimeMismatch {
                            variable: variable.to_string(),
                            expected: ref_time,
                            found: record.reference_time,
                        });
                    }
                    if record.time_unit != unit {
                        diagnostics.push(Diagnostic::TimeUnitMismatch {
                            variable: variable.to_string(),
                            expected: unit,
                            found: record.time_unit,
                        });
                    }
                }
            }
            times.push(valid);
            if is_interval {
                triples.extend(IntervalTriple::from_record(record));
            }
        }

        let (reference_time, unit) = reference?;
        times.sort();
        times.dedup();
        triples.sort_by(|a, b| {
            a.valid_time
                .cmp(&b.valid_time)
                .then(a.start.total_cmp(&b.start))
                .then(a.length.total_cmp(&b.length))
        });
        triples.dedup();

        let key = if is_interval {
            TimeKey::intervals(&triples)
        } else {
            TimeKey::points(&times)
        };
        if let Some(id) = self.index.get(&key) {
            debug!(variable = %variable, id = id.0, "Reusing time coordinate");
            return Some((*id, false));
        }

        let constant_interval = if is_interval {
            constant_length(&triples)
        } else {
            None
        };
        let id = TimeId(self.coords.len());
        debug!(
            variable = %variable,
            id = id.0,
            times = times.len(),
            interval = is_interval,
            "Created time coordinate"
        );
        self.coords.push(TimeCoord {
            id,
            reference_time,
            unit,
            times,
            triples,
            is_interval,
            constant_interval,
            dimension: "time".to_string(),
        });
        self.index.insert(key, id);
        Some((id, true))
    }

    pub fn get(&self, id: TimeId) -> &TimeCoord {
        &self.coords[id.0]
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeCoord> {
        self.coords.iter()
    }

    /// The coordinate with the most cells is `time`, the rest `time1`, `time2`,
    /// ... in creation order.
    pub fn assign_dimension_names(&mut self) {
        let members: Vec<usize> = (0..self.coords.len()).collect();
        let largest = crate::vertical::largest_index(&members, |i| self.coords[i].len());
        let mut seq = 1;
        for (i, coord) in self.coords.iter_mut().enumerate() {
            coord.dimension = if Some(i) == largest {
                "time".to_string()
            } else {
                let dim = format!("time{}", seq);
                seq += 1;
                dim
            };
        }
    }

    pub fn into_vec(self) -> Vec<TimeCoord> {
        self.coords
    }
}

/// Shared length of all non-zero intervals, `None` when they differ.
fn constant_length(triples: &[IntervalTriple]) -> Option<f64> {
    let mut lengths = triples.iter().map(|t| t.length).filter(|l| *l != 0.0);
    match lengths.next() {
        None => Some(0.0),
        Some(first) => lengths.all(|l| l == first).then_some(first),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use grid_record::{ParameterId, StatisticType};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn point(hour: i32) -> GridRecord {
        GridRecord::new(ParameterId::new(0, 0, 0), "g", reference())
            .with_forecast(hour, TimeUnit::Hour)
    }

    fn accum(start: i32, end: i32) -> GridRecord {
        GridRecord::new(ParameterId::new(0, 1, 8), "g", reference())
            .with_interval(start, end, StatisticType::Accumulation)
    }

    #[test]
    fn test_point_coordinate() {
        let mut registry = TimeRegistry::new();
        let mut diags = Vec::new();
        let records = [point(6), point(0), point(3), point(6)];
        let (id, created) = registry
            .find_or_create("t", &records, false, &mut diags)
            .unwrap();
        assert!(created);
        let coord = registry.get(id);
        assert_eq!(coord.values(), vec![0.0, 3.0, 6.0]);
        assert_eq!(coord.index_of(&point(3)), Some(1));
        assert_eq!(coord.index_of(&point(9)), None);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_reuse_is_order_independent() {
        let mut registry = TimeRegistry::new();
        let mut diags = Vec::new();
        let (a, _) = registry
            .find_or_create("a", &[point(0), point(6)], false, &mut diags)
            .unwrap();
        let (b, created) = registry
            .find_or_create("b", &[point(6), point(0)], false, &mut diags)
            .unwrap();
        assert_eq!(a, b);
        assert!(!created);

        let (c, _) = registry
            .find_or_create("c", &[accum(0, 6)], true, &mut diags)
            .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_interval_constant_and_mixed() {
        let mut registry = TimeRegistry::new();
        let mut diags = Vec::new();
        let (constant, _) = registry
            .find_or_create("c", &[accum(0, 6), accum(6, 12)], true, &mut diags)
            .unwrap();
        let coord = registry.get(constant);
        assert!(!coord.is_mixed());
        assert_eq!(coord.interval_label().as_deref(), Some("6 Hour Intervals"));
        assert_eq!(coord.bounds(), vec![(0.0, 6.0), (6.0, 12.0)]);

        let (mixed, _) = registry
            .find_or_create("m", &[accum(0, 6), accum(3, 6), accum(0, 3)], true, &mut diags)
            .unwrap();
        let coord = registry.get(mixed);
        assert!(coord.is_mixed());
        assert_eq!(coord.len(), 2);
        assert_eq!(coord.interval_label().as_deref(), Some("Mixed Intervals"));
        assert_eq!(coord.bounds(), vec![(0.0, 3.0), (0.0, 6.0)]);
    }

    #[test]
    fn test_mixed_bounds_without_zero_start() {
        let mut registry = TimeRegistry::new();
        let mut diags = Vec::new();
        let (id, _) = registry
            .find_or_create("m", &[accum(4, 6), accum(0, 3), accum(3, 6)], true, &mut diags)
            .unwrap();
        let coord = registry.get(id);
        assert!(coord.is_mixed());
        assert_eq!(coord.bounds(), vec![(0.0, 3.0), (3.0, 6.0)]);
    }

    #[test]
    fn test_placement_order() {
        let mut records = vec![accum(4, 6), accum(3, 6), accum(0, 3), accum(0, 6)];
        records.sort_by(placement_order);
        let spans: Vec<(i32, i32)> = records
            .iter()
            .map(|r| (r.interval_start(), r.interval_start() + r.interval_width()))
            .collect();
        assert_eq!(spans, vec![(0, 3), (0, 6), (3, 6), (4, 6)]);
    }

    #[test]
    fn test_unrepresentable_times_are_skipped() {
        let mut registry = TimeRegistry::new();
        let mut diags = Vec::new();
        let far = point(0).with_forecast(i32::MAX, TimeUnit::Century);
        let (id, _) = registry
            .find_or_create("t", &[far.clone(), point(0)], false, &mut diags)
            .unwrap();
        assert_eq!(registry.get(id).values(), vec![0.0]);
        assert_eq!(registry.get(id).index_of(&far), None);
        assert!(registry.find_or_create("t", &[far], false, &mut diags).is_none());
    }

    #[test]
    fn test_reference_mismatch_is_warned_not_excluded() {
        let mut registry = TimeRegistry::new();
        let mut diags = Vec::new();
        let mut late = point(6);
        late.reference_time = reference() + chrono::Duration::hours(6);
        let (id, _) = registry
            .find_or_create("t", &[point(0), late], false, &mut diags)
            .unwrap();
        assert_eq!(registry.get(id).len(), 2);
        assert!(matches!(diags[0], Diagnostic::ReferenceTimeMismatch { .. }));
    }

    #[test]
    fn test_dimension_names() {
        let mut registry = TimeRegistry::new();
        let mut diags = Vec::new();
        let (short, _) = registry
            .find_or_create("a", &[point(0)], false, &mut diags)
            .unwrap();
        let (long, _) = registry
            .find_or_create("b", &[point(0), point(3), point(6)], false, &mut diags)
            .unwrap();
        registry.assign_dimension_names();
        assert_eq!(registry.get(long).dimension, "time");
        assert_eq!(registry.get(short).dimension, "time1");
    }

    #[test]
    fn test_empty_records() {
        let mut registry = TimeRegistry::new();
        let mut diags = Vec::new();
        let none: [GridRecord; 0] = [];
        assert!(registry.find_or_create("t", &none, false, &mut diags).is_none());
    }
}
