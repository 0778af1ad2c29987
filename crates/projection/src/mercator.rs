//! Mercator projection.

use crate::error::{ProjectionError, Result};
use crate::transform::{normalize_radians, MapProjection};
use grid_common::Attribute;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

const NAME: &str = "mercator";

/// Spherical Mercator with a standard parallel, kilometre output.
#[derive(Debug, Clone)]
pub struct Mercator {
    /// Central longitude (degrees)
    pub lon0: f64,
    /// Latitude where the scale is true (degrees)
    pub standard_parallel: f64,
    /// Earth radius (km)
    pub earth_radius: f64,
    /// R * cos(standard_parallel)
    scale: f64,
}

impl Mercator {
    pub fn new(lon0: f64, standard_parallel: f64, earth_radius: f64) -> Result<Self> {
        if standard_parallel.abs() >= 90.0 {
            return Err(ProjectionError::invalid(
                NAME,
                "standard_parallel",
                format!("{} is not between the poles", standard_parallel),
            ));
        }
        if earth_radius <= 0.0 {
            return Err(ProjectionError::invalid(NAME, "earth_radius", "must be positive"));
        }
        Ok(Self {
            lon0,
            standard_parallel,
            earth_radius,
            scale: earth_radius * standard_parallel.to_radians().cos(),
        })
    }
}

impl MapProjection for Mercator {
    fn grid_mapping_name(&self) -> &'static str {
        NAME
    }

    fn lat_lon_to_proj(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        if lat.abs() >= 90.0 {
            return None;
        }
        let x = self.scale * normalize_radians((lon - self.lon0).to_radians());
        let y = self.scale * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        Some((x, y))
    }

    fn proj_to_lat_lon(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let lon = self.lon0 + (x / self.scale).to_degrees();
        let lat = (2.0 * (y / self.scale).exp().atan() - FRAC_PI_2).to_degrees();
        Some((lat, lon))
    }

    fn mapping_attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::new("grid_mapping_name", NAME),
            Attribute::new("standard_parallel", self.standard_parallel),
            Attribute::new("longitude_of_projection_origin", self.lon0),
            Attribute::new("earth_radius", self.earth_radius * 1000.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::EARTH_RADIUS_KM;

    #[test]
    fn test_equator_spacing() {
        let proj = Mercator::new(0.0, 0.0, EARTH_RADIUS_KM).unwrap();
        let (x, _) = proj.lat_lon_to_proj(0.0, 1.0).unwrap();
        assert!((x - EARTH_RADIUS_KM * 1f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_standard_parallel_shrinks_scale() {
        let proj = Mercator::new(0.0, 20.0, EARTH_RADIUS_KM).unwrap();
        let (x, _) = proj.lat_lon_to_proj(0.0, 1.0).unwrap();
        let expected = EARTH_RADIUS_KM * 20f64.to_radians().cos() * 1f64.to_radians();
        assert!((x - expected).abs() < 1e-9);
    }

    #[test]
    fn test_roundtrip() {
        let proj = Mercator::new(-120.0, 20.0, EARTH_RADIUS_KM).unwrap();
        let (x, y) = proj.lat_lon_to_proj(35.5, -100.25).unwrap();
        let (lat, lon) = proj.proj_to_lat_lon(x, y).unwrap();
        assert!((lat - 35.5).abs() < 1e-9);
        assert!((lon + 100.25).abs() < 1e-9);
    }

    #[test]
    fn test_poles_have_no_image() {
        let proj = Mercator::new(0.0, 0.0, EARTH_RADIUS_KM).unwrap();
        assert!(proj.lat_lon_to_proj(90.0, 0.0).is_none());
        assert!(Mercator::new(0.0, 90.0, EARTH_RADIUS_KM).is_err());
    }
}
