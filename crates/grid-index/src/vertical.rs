//! Vertical coordinates and their dedup registry.
//!
//! A vertical coordinate is the sorted, tolerance-deduplicated set of levels
//! one variable's records sit on. Variables whose records produce the same
//! level name and an equal level set share one coordinate.

use grid_record::GridRecord;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Index of a vertical coordinate in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerticalId(pub usize);

/// Tolerant float equality: absolute below magnitude one, relative above.
pub fn values_match(a: f64, b: f64, tolerance: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= tolerance * scale
}

/// One level, or the (bottom, top) bounds of a layer with `value1 <= value2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelValue {
    pub value1: f64,
    /// Zero for plain levels.
    pub value2: f64,
}

impl LevelValue {
    pub fn level(value: f64) -> Self {
        Self {
            value1: value,
            value2: 0.0,
        }
    }

    /// Layer bounds, normalised so `value1 <= value2`.
    pub fn layer(a: f64, b: f64) -> Self {
        Self {
            value1: a.min(b),
            value2: a.max(b),
        }
    }

    /// Level value read from a record.
    pub fn from_record(record: &GridRecord, is_layer: bool) -> Self {
        if is_layer {
            Self::layer(record.level1, record.level2)
        } else {
            Self::level(record.level1)
        }
    }

    pub fn midpoint(&self, is_layer: bool) -> f64 {
        if is_layer {
            (self.value1 + self.value2) / 2.0
        } else {
            self.value1
        }
    }

    pub fn matches(&self, other: &LevelValue, tolerance: f64) -> bool {
        values_match(self.value1, other.value1, tolerance)
            && values_match(self.value2, other.value2, tolerance)
    }
}

/// Hybrid sigma-pressure factors, one pair per level in coordinate order.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridFactors {
    pub a: Vec<f64>,
    pub b: Vec<f64>,
}

impl HybridFactors {
    /// Split packed factors (all `a` then all `b`) and pick one pair per level.
    ///
    /// Hybrid levels are numbered from 1; a level whose value is a valid
    /// number selects that entry, any other level takes its position.
    pub fn from_packed(packed: &[f64], levels: &[LevelValue]) -> Option<Self> {
        let half = packed.len() / 2;
        if half == 0 {
            return None;
        }
        let (a_all, b_all) = (&packed[..half], &packed[half..2 * half]);
        let count = levels.len().min(half);

        let mut a = Vec::with_capacity(count);
        let mut b = Vec::with_capacity(count);
        for (position, level) in levels.iter().take(count).enumerate() {
            let number = level.value1;
            let index = if number.fract() == 0.0 && number >= 1.0 && (number as usize) <= half {
                number as usize - 1
            } else {
                position
            };
            a.push(a_all[index]);
            b.push(b_all[index]);
        }
        Some(Self { a, b })
    }
}

/// Level metadata shared by every record of one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSpec {
    pub level_name: String,
    pub description: String,
    pub units: String,
    pub level_type: i32,
    pub positive_up: bool,
    /// False when the format marks the level as non-varying.
    pub use_vertical: bool,
    pub is_layer: bool,
    pub is_hybrid: bool,
}

/// A deduplicated, sorted vertical coordinate.
#[derive(Debug, Clone)]
pub struct VerticalCoord {
    pub id: VerticalId,
    pub spec: LevelSpec,
    levels: Vec<LevelValue>,
    pub hybrid: Option<HybridFactors>,
    /// Dimension name, assigned after all coordinates exist.
    pub dimension: String,
}

impl VerticalCoord {
    /// Build a coordinate from its records' levels.
    pub fn from_records<'a>(
        id: VerticalId,
        spec: LevelSpec,
        records: impl IntoIterator<Item = &'a GridRecord>,
        tolerance: f64,
    ) -> Self {
        let levels = collect_levels(records, spec.is_layer, tolerance);
        Self::from_levels(id, spec, levels)
    }

    fn from_levels(id: VerticalId, spec: LevelSpec, mut levels: Vec<LevelValue>) -> Self {
        let is_layer = spec.is_layer;
        levels.sort_by(|a, b| {
            a.midpoint(is_layer)
                .partial_cmp(&b.midpoint(is_layer))
                .unwrap_or(Ordering::Equal)
        });
        if !spec.positive_up {
            levels.reverse();
        }
        let dimension = spec.level_name.clone();
        Self {
            id,
            spec,
            levels,
            hybrid: None,
            dimension,
        }
    }

    pub fn level_name(&self) -> &str {
        &self.spec.level_name
    }

    pub fn levels(&self) -> &[LevelValue] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn positive(&self) -> &'static str {
        if self.spec.positive_up {
            "up"
        } else {
            "down"
        }
    }

    /// Whether variables on this coordinate carry a vertical dimension.
    pub fn has_dimension(&self) -> bool {
        self.spec.use_vertical || self.levels.len() > 1
    }

    /// Midpoint values in coordinate order.
    pub fn values(&self) -> Vec<f64> {
        self.levels
            .iter()
            .map(|l| l.midpoint(self.spec.is_layer))
            .collect()
    }

    /// Position of a record's level, tolerant.
    pub fn index_of(&self, record: &GridRecord, tolerance: f64) -> Option<usize> {
        let wanted = LevelValue::from_record(record, self.spec.is_layer);
        self.levels.iter().position(|l| l.matches(&wanted, tolerance))
    }

    /// Same level set, order-independent and tolerant.
    pub fn matches_levels(&self, candidate: &[LevelValue], tolerance: f64) -> bool {
        self.levels.len() == candidate.len()
            && candidate
                .iter()
                .all(|c| self.levels.iter().any(|l| l.matches(c, tolerance)))
    }
}

/// Distinct levels of a record set, first occurrence wins.
fn collect_levels<'a>(
    records: impl IntoIterator<Item = &'a GridRecord>,
    is_layer: bool,
    tolerance: f64,
) -> Vec<LevelValue> {
    let mut levels: Vec<LevelValue> = Vec::new();
    for record in records {
        let level = LevelValue::from_record(record, is_layer);
        if !levels.iter().any(|l| l.matches(&level, tolerance)) {
            levels.push(level);
        }
    }
    levels
}

/// Find-or-create registry for vertical coordinates.
///
/// Candidates are bucketed by (level name, level count); within a bucket the
/// first coordinate with a tolerant-equal level set is reused.
#[derive(Debug, Default)]
pub struct VerticalRegistry {
    coords: Vec<VerticalCoord>,
    buckets: HashMap<(String, usize), Vec<VerticalId>>,
    tolerance: f64,
}

impl VerticalRegistry {
    pub fn new(tolerance: f64) -> Self {
        Self {
            coords: Vec::new(),
            buckets: HashMap::new(),
            tolerance,
        }
    }

    /// Reuse a coordinate with the same name and level set, or create one.
    ///
    /// Returns the id and whether it was newly created.
    pub fn find_or_create<'a>(
        &mut self,
        spec: LevelSpec,
        records: impl IntoIterator<Item = &'a GridRecord>,
    ) -> (VerticalId, bool) {
        let candidate = collect_levels(records, spec.is_layer, self.tolerance);
        let bucket_key = (spec.level_name.clone(), candidate.len());

        if let Some(ids) = self.buckets.get(&bucket_key) {
            for id in ids {
                let coord = &self.coords[id.0];
                if coord.matches_levels(&candidate, self.tolerance) {
                    debug!(level = %spec.level_name, id = id.0, "Reusing vertical coordinate");
                    return (*id, false);
                }
            }
        }

        let id = VerticalId(self.coords.len());
        debug!(
            level = %spec.level_name,
            id = id.0,
            levels = candidate.len(),
            "Created vertical coordinate"
        );
        self.coords.push(VerticalCoord::from_levels(id, spec, candidate));
        self.buckets.entry(bucket_key).or_default().push(id);
        (id, true)
    }

    pub fn get(&self, id: VerticalId) -> &VerticalCoord {
        &self.coords[id.0]
    }

    pub fn get_mut(&mut self, id: VerticalId) -> &mut VerticalCoord {
        &mut self.coords[id.0]
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VerticalCoord> {
        self.coords.iter()
    }

    /// Name dimensions: coordinates sharing a level name get sequence numbers,
    /// except the one with the most levels which keeps the bare name.
    pub fn assign_dimension_names(&mut self) {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, coord) in self.coords.iter().enumerate() {
            by_name.entry(coord.spec.level_name.clone()).or_default().push(i);
        }
        for (name, members) in by_name {
            let largest = largest_index(&members, |i| self.coords[i].len());
            let mut seq = 1;
            for i in members {
                self.coords[i].dimension = if Some(i) == largest {
                    name.clone()
                } else {
                    let dim = format!("{}{}", name, seq);
                    seq += 1;
                    dim
                };
            }
        }
    }

    pub fn into_vec(self) -> Vec<VerticalCoord> {
        self.coords
    }
}

/// First member with the strictly largest size.
pub(crate) fn largest_index(members: &[usize], size: impl Fn(usize) -> usize) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for &i in members {
        let n = size(i);
        if best.map_or(true, |(_, max)| n > max) {
            best = Some((i, n));
        }
    }
    best.map(|(i, _)| i)
}
