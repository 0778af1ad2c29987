//! Polar stereographic projection.
//!
//! Grid definitions quote spacing true at 60 degrees latitude, so the builder
//! passes [`TRUE_SCALE_AT_60`] as the scale at the pole.

use crate::error::{ProjectionError, Result};
use crate::transform::{normalize_radians, MapProjection};
use grid_common::Attribute;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

const NAME: &str = "polar_stereographic";

/// Scale factor at the pole that makes the projection true at 60 degrees: (1 + sin 60) / 2.
pub const TRUE_SCALE_AT_60: f64 = 0.933;

/// Spherical polar stereographic projection with kilometre output.
#[derive(Debug, Clone)]
pub struct PolarStereographic {
    /// Latitude of the projection centre: 90 or -90
    pub lat0: f64,
    /// Straight vertical longitude (degrees)
    pub lon0: f64,
    /// Scale factor at the pole
    pub scale: f64,
    /// Earth radius (km)
    pub earth_radius: f64,
}

impl PolarStereographic {
    pub fn new(north_pole: bool, lon0: f64, scale: f64, earth_radius: f64) -> Result<Self> {
        if scale <= 0.0 || !scale.is_finite() {
            return Err(ProjectionError::invalid(NAME, "scale", format!("{} is not positive", scale)));
        }
        if earth_radius <= 0.0 {
            return Err(ProjectionError::invalid(NAME, "earth_radius", "must be positive"));
        }
        Ok(Self {
            lat0: if north_pole { 90.0 } else { -90.0 },
            lon0,
            scale,
            earth_radius,
        })
    }

    pub fn is_north(&self) -> bool {
        self.lat0 > 0.0
    }

    fn two_rk(&self) -> f64 {
        2.0 * self.earth_radius * self.scale
    }
}

impl MapProjection for PolarStereographic {
    fn grid_mapping_name(&self) -> &'static str {
        NAME
    }

    fn lat_lon_to_proj(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        let phi = lat.to_radians();
        let dlon = normalize_radians((lon - self.lon0).to_radians());
        if self.is_north() {
            if lat <= -90.0 {
                return None;
            }
            let rho = self.two_rk() * (FRAC_PI_4 - phi / 2.0).tan();
            Some((rho * dlon.sin(), -rho * dlon.cos()))
        } else {
            if lat >= 90.0 {
                return None;
            }
            let rho = self.two_rk() * (FRAC_PI_4 + phi / 2.0).tan();
            Some((rho * dlon.sin(), rho * dlon.cos()))
        }
    }

    fn proj_to_lat_lon(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rho = x.hypot(y);
        let c = 2.0 * (rho / self.two_rk()).atan();
        if self.is_north() {
            let lat = (FRAC_PI_2 - c).to_degrees();
            let lon = if rho == 0.0 { self.lon0 } else { self.lon0 + x.atan2(-y).to_degrees() };
            Some((lat, lon))
        } else {
            let lat = (c - FRAC_PI_2).to_degrees();
            let lon = if rho == 0.0 { self.lon0 } else { self.lon0 + x.atan2(y).to_degrees() };
            Some((lat, lon))
        }
    }

    fn mapping_attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::new("grid_mapping_name", NAME),
            Attribute::new("longitude_of_projection_origin", self.lon0),
            Attribute::new("straight_vertical_longitude_from_pole", self.lon0),
            Attribute::new("scale_factor_at_projection_origin", self.scale),
            Attribute::new("latitude_of_projection_origin", self.lat0),
            Attribute::new("earth_radius", self.earth_radius * 1000.0),
        ]
    }
}
