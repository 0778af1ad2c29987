//! Gaussian latitudes and quadrature weights.
//!
//! The latitudes of a Gaussian grid with `n` rows are the arcsines of the roots
//! of the Legendre polynomial of degree `n`, ordered north to south.

use std::f64::consts::PI;

const NEWTON_TOLERANCE: f64 = 1e-15;
const NEWTON_MAX_ITERATIONS: usize = 100;

/// Gaussian latitudes (degrees, north to south) and their weights.
#[derive(Debug, Clone)]
pub struct GaussianLatitudes {
    pub latitudes: Vec<f64>,
    pub weights: Vec<f64>,
}

impl GaussianLatitudes {
    /// Compute `nlat` latitudes. Usually `nlat = 2 * N` where `N` is the number
    /// of parallels between a pole and the equator.
    pub fn new(nlat: usize) -> Self {
        let mut latitudes = vec![0.0; nlat];
        let mut weights = vec![0.0; nlat];
        let n = nlat as f64;

        for i in 0..nlat.div_ceil(2) {
            let mut z = (PI * (i as f64 + 0.75) / (n + 0.5)).cos();
            for _ in 0..NEWTON_MAX_ITERATIONS {
                let (p, dp) = legendre(nlat, z);
                let previous = z;
                z = previous - p / dp;
                if (z - previous).abs() < NEWTON_TOLERANCE {
                    break;
                }
            }
            let (_, derivative) = legendre(nlat, z);
            let weight = 2.0 / ((1.0 - z * z) * derivative * derivative);
            let lat = z.asin().to_degrees();

            latitudes[i] = lat;
            latitudes[nlat - 1 - i] = -lat;
            weights[i] = weight;
            weights[nlat - 1 - i] = weight;
        }

        Self { latitudes, weights }
    }

    pub fn len(&self) -> usize {
        self.latitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latitudes.is_empty()
    }

    /// Index of the latitude closest to `lat`.
    pub fn nearest_index(&self, lat: f64) -> Option<usize> {
        self.latitudes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - lat).abs().total_cmp(&(*b - lat).abs()))
            .map(|(i, _)| i)
    }
}

/// Value and derivative of the Legendre polynomial of degree `n` at `z`.
fn legendre(n: usize, z: f64) -> (f64, f64) {
    let mut p1 = 1.0;
    let mut p2 = 0.0;
    for j in 1..=n {
        let p3 = p2;
        p2 = p1;
        let jf = j as f64;
        p1 = ((2.0 * jf - 1.0) * z * p2 - (jf - 1.0) * p3) / jf;
    }
    let dp = n as f64 * (z * p1 - p2) / (z * z - 1.0);
    (p1, dp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_point_rule() {
        let g = GaussianLatitudes::new(2);
        let expected = (1.0 / 3f64.sqrt()).asin().to_degrees();
        assert!((g.latitudes[0] - expected).abs() < 1e-12);
        assert!((g.latitudes[1] + expected).abs() < 1e-12);
        assert!((g.weights[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_sum_to_two() {
        for nlat in [32, 94, 192] {
            let g = GaussianLatitudes::new(nlat);
            let sum: f64 = g.weights.iter().sum();
            assert!((sum - 2.0).abs() < 1e-10, "nlat {} sum {}", nlat, sum);
        }
    }

    #[test]
    fn test_north_to_south_and_symmetric() {
        let g = GaussianLatitudes::new(94);
        assert!(g.latitudes.windows(2).all(|w| w[0] > w[1]));
        for i in 0..47 {
            assert!((g.latitudes[i] + g.latitudes[93 - i]).abs() < 1e-12);
        }
        // T62 grid first row.
        assert!((g.latitudes[0] - 88.542).abs() < 1e-3, "{}", g.latitudes[0]);
    }

    #[test]
    fn test_nearest_index() {
        let g = GaussianLatitudes::new(94);
        assert_eq!(g.nearest_index(88.5), Some(0));
        assert_eq!(g.nearest_index(-89.0), Some(93));
    }
}
