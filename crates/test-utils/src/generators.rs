//! Test data generators for record sets.
//!
//! Synthesis must not depend on record order, so most generators here come
//! with a seeded shuffle that produces the same permutation on every run.

use crate::fixtures::{isobaric, surface};
use grid_record::{GridRecord, ParameterId};

/// Standard isobaric levels in hPa, surface upwards.
pub const STANDARD_ISOBARIC_HPA: &[f64] = &[1000.0, 925.0, 850.0, 700.0, 500.0, 300.0, 250.0];

/// Minimal linear congruential generator (Knuth MMIX constants).
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    /// Uniform index in `0..bound`. `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        ((self.next_u64() >> 33) % bound as u64) as usize
    }
}

/// Fisher-Yates shuffle driven by [`Lcg`].
///
/// # Example
///
/// ```
/// use test_utils::shuffled;
///
/// let a = shuffled(vec![1, 2, 3, 4, 5], 7);
/// let b = shuffled(vec![1, 2, 3, 4, 5], 7);
/// assert_eq!(a, b);
/// ```
pub fn shuffled<T>(mut items: Vec<T>, seed: u64) -> Vec<T> {
    let mut rng = Lcg::new(seed);
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
    items
}

/// One isobaric record per (level, hour) pair, level-major.
pub fn isobaric_records(
    definition: &str,
    parameter: ParameterId,
    levels_hpa: &[f64],
    hours: &[i32],
) -> Vec<GridRecord> {
    levels_hpa
        .iter()
        .flat_map(|hpa| hours.iter().map(move |h| isobaric(definition, parameter, *hpa, *h)))
        .collect()
}

/// One surface record per hour.
pub fn surface_records(definition: &str, parameter: ParameterId, hours: &[i32]) -> Vec<GridRecord> {
    hours.iter().map(|h| surface(definition, parameter, *h)).collect()
}
