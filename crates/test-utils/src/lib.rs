//! Test support for the grid indexing crates.
//!
//! - [`fixtures`]: grid definitions per projection family, parameter ids and
//!   record builders sharing one reference time
//! - [`generators`]: record sets and a seeded shuffle for order-independence tests
//!
//! Pull it in as a dev-dependency (`test-utils = { path = "../test-utils" }`)
//! and import from the crate root:
//!
//! ```ignore
//! use test_utils::{grids, isobaric, params, shuffled};
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Default tolerance for the approximate assertions.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// True when `left` and `right` differ by at most `epsilon`.
///
/// Two NaNs compare equal, which is what coordinate arrays with
/// off-disk points need.
pub fn approx_eq(left: f64, right: f64, epsilon: f64) -> bool {
    if left.is_nan() || right.is_nan() {
        return left.is_nan() && right.is_nan();
    }
    (left - right).abs() <= epsilon
}

/// Assert two numbers agree within an epsilon ([`DEFAULT_EPSILON`] when omitted).
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0, 1e-3);
/// assert_approx_eq!(0.1 + 0.2, 0.3);
/// assert_approx_eq!(f64::NAN, f64::NAN);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $crate::DEFAULT_EPSILON)
    };
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        if !$crate::approx_eq(left, right, epsilon) {
            panic!(
                "values differ: left = {:?}, right = {:?}, |diff| = {:?} > {:?}",
                left,
                right,
                (left - right).abs(),
                epsilon
            );
        }
    }};
}

/// Assert two (lat, lon) or (x, y) pairs agree component-wise.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr $(,)?) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

/// Assert two float slices have the same length and agree element-wise.
///
/// The panic message names the first index that differs.
#[macro_export]
macro_rules! assert_values_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let left: &[f64] = &$left;
        let right: &[f64] = &$right;
        let epsilon = $epsilon as f64;
        assert_eq!(left.len(), right.len(), "length mismatch: {:?} vs {:?}", left, right);
        if let Some(i) = (0..left.len()).find(|&i| !$crate::approx_eq(left[i], right[i], epsilon)) {
            panic!(
                "values differ at index {}: {:?} vs {:?} (epsilon {:?})",
                i, left[i], right[i], epsilon
            );
        }
    }};
}
