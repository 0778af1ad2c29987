//! Space-view projections: orthographic and vertical (near-side) perspective.

use crate::error::{ProjectionError, Result};
use crate::transform::{normalize_radians, MapProjection};
use grid_common::Attribute;

/// Orthographic view from infinitely far away.
#[derive(Debug, Clone)]
pub struct Orthographic {
    pub lat0: f64,
    pub lon0: f64,
    /// Earth radius (km)
    pub earth_radius: f64,
}

impl Orthographic {
    pub fn new(lat0: f64, lon0: f64, earth_radius: f64) -> Self {
        Self {
            lat0,
            lon0,
            earth_radius,
        }
    }
}

/// Sphere geometry shared by both views: (cos c, x/R term, y/R term).
fn view_terms(lat0: f64, lon0: f64, lat: f64, lon: f64) -> (f64, f64, f64) {
    let (phi1, phi) = (lat0.to_radians(), lat.to_radians());
    let dlon = normalize_radians((lon - lon0).to_radians());
    let cos_c = phi1.sin() * phi.sin() + phi1.cos() * phi.cos() * dlon.cos();
    let x = phi.cos() * dlon.sin();
    let y = phi1.cos() * phi.sin() - phi1.sin() * phi.cos() * dlon.cos();
    (cos_c, x, y)
}

/// Latitude/longitude from the angular distance `c` and the planar point.
fn invert_terms(lat0: f64, lon0: f64, x: f64, y: f64, sin_c: f64, cos_c: f64) -> (f64, f64) {
    let rho = x.hypot(y);
    if rho == 0.0 {
        return (lat0, lon0);
    }
    let phi1 = lat0.to_radians();
    let lat = (cos_c * phi1.sin() + y * sin_c * phi1.cos() / rho)
        .clamp(-1.0, 1.0)
        .asin();
    let lon = lon0.to_radians()
        + (x * sin_c).atan2(rho * phi1.cos() * cos_c - y * phi1.sin() * sin_c);
    (lat.to_degrees(), lon.to_degrees())
}

impl MapProjection for Orthographic {
    fn grid_mapping_name(&self) -> &'static str {
        "orthographic"
    }

    fn lat_lon_to_proj(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        let (cos_c, x, y) = view_terms(self.lat0, self.lon0, lat, lon);
        if cos_c < 0.0 {
            return None;
        }
        Some((self.earth_radius * x, self.earth_radius * y))
    }

    fn proj_to_lat_lon(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rho = x.hypot(y);
        if rho > self.earth_radius {
            return None;
        }
        let sin_c = rho / self.earth_radius;
        let cos_c = (1.0 - sin_c * sin_c).sqrt();
        Some(invert_terms(self.lat0, self.lon0, x, y, sin_c, cos_c))
    }

    fn mapping_attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::new("grid_mapping_name", "orthographic"),
            Attribute::new("longitude_of_projection_origin", self.lon0),
            Attribute::new("latitude_of_projection_origin", self.lat0),
            Attribute::new("earth_radius", self.earth_radius * 1000.0),
        ]
    }
}

/// Vertical perspective view from a finite height above the surface.
#[derive(Debug, Clone)]
pub struct VerticalPerspective {
    pub lat0: f64,
    pub lon0: f64,
    /// Earth radius (km)
    pub earth_radius: f64,
    /// Height of the viewing point above the surface (km)
    pub height: f64,
    /// Distance of the viewing point from the centre in earth radii
    p: f64,
}

impl VerticalPerspective {
    pub fn new(lat0: f64, lon0: f64, earth_radius: f64, height: f64) -> Result<Self> {
        if height <= 0.0 || !height.is_finite() {
            return Err(ProjectionError::invalid(
                "vertical_perspective",
                "height",
                format!("{} km is not above the surface", height),
            ));
        }
        Ok(Self {
            lat0,
            lon0,
            earth_radius,
            height,
            p: 1.0 + height / earth_radius,
        })
    }
}

impl MapProjection for VerticalPerspective {
    fn grid_mapping_name(&self) -> &'static str {
        "vertical_perspective"
    }

    fn lat_lon_to_proj(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        let (cos_c, x, y) = view_terms(self.lat0, self.lon0, lat, lon);
        if cos_c < 1.0 / self.p {
            return None;
        }
        let k = (self.p - 1.0) / (self.p - cos_c);
        Some((self.earth_radius * k * x, self.earth_radius * k * y))
    }

    fn proj_to_lat_lon(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rho = x.hypot(y);
        if rho == 0.0 {
            return Some((self.lat0, self.lon0));
        }
        let r = self.earth_radius;
        let p = self.p;
        let radicand = 1.0 - rho * rho * (p + 1.0) / (r * r * (p - 1.0));
        if radicand < 0.0 {
            return None;
        }
        let sin_c = (p - radicand.sqrt()) / (r * (p - 1.0) / rho + rho / (r * (p - 1.0)));
        if sin_c.abs() > 1.0 {
            return None;
        }
        let cos_c = (1.0 - sin_c * sin_c).sqrt();
        Some(invert_terms(self.lat0, self.lon0, x, y, sin_c, cos_c))
    }

    fn mapping_attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::new("grid_mapping_name", "vertical_perspective"),
            Attribute::new("longitude_of_projection_origin", self.lon0),
            Attribute::new("latitude_of_projection_origin", self.lat0),
            Attribute::new("height_above_earth", self.height * 1000.0),
            Attribute::new("earth_radius", self.earth_radius * 1000.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::EARTH_RADIUS_KM;

    #[test]
    fn test_orthographic_roundtrip_and_horizon() {
        let proj = Orthographic::new(10.0, 20.0, EARTH_RADIUS_KM);
        let (x, y) = proj.lat_lon_to_proj(30.0, 40.0).unwrap();
        let (lat, lon) = proj.proj_to_lat_lon(x, y).unwrap();
        assert!((lat - 30.0).abs() < 1e-9);
        assert!((lon - 40.0).abs() < 1e-9);
        assert!(proj.lat_lon_to_proj(-10.0, -160.0).is_none());
        assert!(proj.proj_to_lat_lon(EARTH_RADIUS_KM * 1.01, 0.0).is_none());
    }

    #[test]
    fn test_perspective_roundtrip() {
        let proj = VerticalPerspective::new(0.0, 0.0, EARTH_RADIUS_KM, 35_785.0).unwrap();
        let (x, y) = proj.lat_lon_to_proj(45.0, 30.0).unwrap();
        let (lat, lon) = proj.proj_to_lat_lon(x, y).unwrap();
        assert!((lat - 45.0).abs() < 1e-8, "lat {}", lat);
        assert!((lon - 30.0).abs() < 1e-8, "lon {}", lon);
    }

    #[test]
    fn test_perspective_horizon() {
        let proj = VerticalPerspective::new(0.0, 0.0, EARTH_RADIUS_KM, 35_785.0).unwrap();
        assert!(proj.lat_lon_to_proj(0.0, 85.0).is_none());
        assert!(proj.proj_to_lat_lon(EARTH_RADIUS_KM, EARTH_RADIUS_KM).is_none());
        assert!(VerticalPerspective::new(0.0, 0.0, EARTH_RADIUS_KM, 0.0).is_err());
    }
}
