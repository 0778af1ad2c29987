//! Lambert Conformal Conic projection.
//!
//! Used by most regional NWP grids (HRRR, NAM). A cone tangent or secant to
//! the sphere is unrolled onto a plane:
//! - Origin latitude (lat0): projection-space y = 0
//! - Central meridian (lon0): LoV in grid definitions
//! - Standard parallel(s): Latin1 and Latin2 (equal for a tangent cone)

use crate::error::{ProjectionError, Result};
use crate::transform::{normalize_radians, MapProjection};
use grid_common::{Attribute, AttributeValue};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

const NAME: &str = "lambert_conformal_conic";

/// Spherical Lambert Conformal Conic projection with kilometre output.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Latitude of the projection origin (degrees)
    pub lat0: f64,
    /// Central meridian (degrees)
    pub lon0: f64,
    /// First standard parallel (degrees)
    pub par1: f64,
    /// Second standard parallel (degrees)
    pub par2: f64,
    /// Earth radius (km)
    pub earth_radius: f64,
    /// Cone constant
    n: f64,
    /// R * F
    rf: f64,
    /// Rho at the origin latitude
    rho0: f64,
}

impl LambertConformal {
    /// Build a projection from its defining angles (degrees).
    pub fn new(lat0: f64, lon0: f64, par1: f64, par2: f64, earth_radius: f64) -> Result<Self> {
        if earth_radius <= 0.0 {
            return Err(ProjectionError::invalid(NAME, "earth_radius", "must be positive"));
        }
        let phi1 = par1.to_radians();
        let phi2 = par2.to_radians();

        let n = if (phi1 - phi2).abs() < 1e-10 {
            phi1.sin()
        } else {
            let ln_ratio = (phi1.cos() / phi2.cos()).ln();
            let tan_ratio = ((FRAC_PI_4 + phi2 / 2.0).tan() / (FRAC_PI_4 + phi1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };
        if !n.is_finite() || n.abs() < 1e-10 {
            return Err(ProjectionError::invalid(
                NAME,
                "standard_parallel",
                format!("degenerate cone for parallels {} and {}", par1, par2),
            ));
        }

        let f = phi1.cos() * (FRAC_PI_4 + phi1 / 2.0).tan().powf(n) / n;
        let rf = earth_radius * f;
        let rho0 = rf / (FRAC_PI_4 + lat0.to_radians() / 2.0).tan().powf(n);

        Ok(Self {
            lat0,
            lon0,
            par1,
            par2,
            earth_radius,
            n,
            rf,
            rho0,
        })
    }

    /// Cone constant.
    pub fn cone(&self) -> f64 {
        self.n
    }
}

impl MapProjection for LambertConformal {
    fn grid_mapping_name(&self) -> &'static str {
        NAME
    }

    fn lat_lon_to_proj(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        let phi = lat.to_radians();
        // The apex of the cone has no image.
        if (phi.abs() - FRAC_PI_2).abs() < 1e-12 && phi.signum() != self.n.signum() {
            return None;
        }
        let rho = self.rf / (FRAC_PI_4 + phi / 2.0).tan().powf(self.n);
        let theta = self.n * normalize_radians((lon - self.lon0).to_radians());
        Some((rho * theta.sin(), self.rho0 - rho * theta.cos()))
    }

    fn proj_to_lat_lon(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let sign = self.n.signum();
        let dy = self.rho0 - y;
        let rho = sign * x.hypot(dy);
        let theta = (sign * x).atan2(sign * dy);

        let lat = if rho == 0.0 {
            sign * 90.0
        } else {
            (2.0 * (self.rf / rho).powf(1.0 / self.n).atan() - FRAC_PI_2).to_degrees()
        };
        let lon = self.lon0 + (theta / self.n).to_degrees();
        if lat.is_finite() && lon.is_finite() {
            Some((lat, lon))
        } else {
            None
        }
    }

    fn mapping_attributes(&self) -> Vec<Attribute> {
        let parallels = if (self.par1 - self.par2).abs() < 1e-10 {
            AttributeValue::Double(self.par1)
        } else {
            AttributeValue::Doubles(vec![self.par1, self.par2])
        };
        vec![
            Attribute::new("grid_mapping_name", NAME),
            Attribute::new("standard_parallel", parallels),
            Attribute::new("longitude_of_central_meridian", self.lon0),
            Attribute::new("latitude_of_projection_origin", self.lat0),
            Attribute::new("earth_radius", self.earth_radius * 1000.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::EARTH_RADIUS_KM;

    fn hrrr() -> LambertConformal {
        LambertConformal::new(38.5, -97.5, 38.5, 38.5, EARTH_RADIUS_KM).unwrap()
    }

    #[test]
    fn test_origin_maps_to_zero() {
        let (x, y) = hrrr().lat_lon_to_proj(38.5, -97.5).unwrap();
        assert!(x.abs() < 1e-9, "x = {}", x);
        assert!(y.abs() < 1e-9, "y = {}", y);
    }

    #[test]
    fn test_hrrr_first_point() {
        let (x, y) = hrrr().lat_lon_to_proj(21.138123, -122.719528).unwrap();
        assert!((x + 2697.52).abs() < 0.05, "x = {}", x);
        assert!((y + 1587.31).abs() < 0.05, "y = {}", y);
    }

    #[test]
    fn test_roundtrip() {
        let proj = LambertConformal::new(25.0, 265.0, 25.0, 25.0, EARTH_RADIUS_KM).unwrap();
        for (lat, lon) in [(20.0, -110.0), (45.0, -80.0), (52.0, -130.0)] {
            let (x, y) = proj.lat_lon_to_proj(lat, lon).unwrap();
            let (lat2, lon2) = proj.proj_to_lat_lon(x, y).unwrap();
            assert!((lat - lat2).abs() < 1e-8, "lat {} vs {}", lat, lat2);
            let dlon = crate::transform::normalize_longitude(lon - lon2);
            assert!(dlon.abs() < 1e-8, "lon {} vs {}", lon, lon2);
        }
    }

    #[test]
    fn test_secant_cone_between_parallels() {
        let proj = LambertConformal::new(40.0, -100.0, 33.0, 45.0, EARTH_RADIUS_KM).unwrap();
        let n = proj.cone();
        assert!(n > 33f64.to_radians().sin() && n < 45f64.to_radians().sin());
        let attrs = proj.mapping_attributes();
        assert_eq!(
            Attribute::find(&attrs, "standard_parallel"),
            Some(&AttributeValue::Doubles(vec![33.0, 45.0]))
        );
    }

    #[test]
    fn test_southern_hemisphere_cone() {
        let proj = LambertConformal::new(-30.0, 135.0, -30.0, -30.0, EARTH_RADIUS_KM).unwrap();
        assert!(proj.cone() < 0.0);
        let (x, y) = proj.lat_lon_to_proj(-35.0, 140.0).unwrap();
        let (lat, lon) = proj.proj_to_lat_lon(x, y).unwrap();
        assert!((lat + 35.0).abs() < 1e-8);
        assert!((lon - 140.0).abs() < 1e-8);
    }

    #[test]
    fn test_equator_tangent_rejected() {
        assert!(LambertConformal::new(0.0, 0.0, 0.0, 0.0, EARTH_RADIUS_KM).is_err());
    }
}
