//! Rotated pole latitude/longitude grids.
//!
//! Projection coordinates are rotated longitude/latitude in degrees. The
//! rotated grid's south pole sits at (`south_pole_lat`, `south_pole_lon`) in
//! geographic coordinates, and `angle` spins the grid about the new polar axis.

use crate::transform::{normalize_longitude, MapProjection};
use grid_common::Attribute;
use nalgebra::{Rotation3, Vector3};

const NAME: &str = "rotated_latitude_longitude";

#[derive(Debug, Clone)]
pub struct RotatedLatLon {
    pub south_pole_lat: f64,
    pub south_pole_lon: f64,
    pub angle: f64,
    /// Rotated frame to geographic frame.
    to_geographic: Rotation3<f64>,
}

impl RotatedLatLon {
    pub fn new(south_pole_lat: f64, south_pole_lon: f64, angle: f64) -> Self {
        let spin = Rotation3::from_axis_angle(&Vector3::z_axis(), angle.to_radians());
        let tilt = Rotation3::from_axis_angle(
            &Vector3::y_axis(),
            -(90.0 + south_pole_lat).to_radians(),
        );
        let swing = Rotation3::from_axis_angle(&Vector3::z_axis(), south_pole_lon.to_radians());
        Self {
            south_pole_lat,
            south_pole_lon,
            angle,
            to_geographic: swing * tilt * spin,
        }
    }

    /// Geographic position of the north pole of the rotated grid.
    pub fn north_pole(&self) -> (f64, f64) {
        (
            -self.south_pole_lat,
            normalize_longitude(self.south_pole_lon + 180.0),
        )
    }
}

fn to_vector(lat: f64, lon: f64) -> Vector3<f64> {
    let (phi, lambda) = (lat.to_radians(), lon.to_radians());
    Vector3::new(phi.cos() * lambda.cos(), phi.cos() * lambda.sin(), phi.sin())
}

fn from_vector(v: &Vector3<f64>) -> (f64, f64) {
    let lat = v.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = v.y.atan2(v.x).to_degrees();
    (lat, lon)
}

impl MapProjection for RotatedLatLon {
    fn grid_mapping_name(&self) -> &'static str {
        NAME
    }

    fn lat_lon_to_proj(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        let rotated = self.to_geographic.inverse() * to_vector(lat, lon);
        let (rlat, rlon) = from_vector(&rotated);
        Some((rlon, rlat))
    }

    fn proj_to_lat_lon(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        Some(from_vector(&(self.to_geographic * to_vector(y, x))))
    }

    fn mapping_attributes(&self) -> Vec<Attribute> {
        let (np_lat, np_lon) = self.north_pole();
        vec![
            Attribute::new("grid_mapping_name", NAME),
            Attribute::new("grid_south_pole_latitude", self.south_pole_lat),
            Attribute::new("grid_south_pole_longitude", self.south_pole_lon),
            Attribute::new("grid_south_pole_angle", self.angle),
            Attribute::new("grid_north_pole_latitude", np_lat),
            Attribute::new("grid_north_pole_longitude", np_lon),
        ]
    }

    fn is_angular(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrotated_is_identity() {
        let proj = RotatedLatLon::new(-90.0, 0.0, 0.0);
        let (x, y) = proj.lat_lon_to_proj(45.0, 10.0).unwrap();
        assert!((x - 10.0).abs() < 1e-9 && (y - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_south_pole_location() {
        let proj = RotatedLatLon::new(-40.0, 10.0, 0.0);
        let (lat, lon) = proj.proj_to_lat_lon(0.0, -90.0).unwrap();
        assert!((lat + 40.0).abs() < 1e-9, "lat {}", lat);
        assert!((lon - 10.0).abs() < 1e-9, "lon {}", lon);
    }

    #[test]
    fn test_rotated_equator_origin() {
        // COSMO-style pole: rotated (0, 0) lies on the geographic meridian of the south pole.
        let proj = RotatedLatLon::new(-40.0, 10.0, 0.0);
        let (lat, lon) = proj.proj_to_lat_lon(0.0, 0.0).unwrap();
        assert!((lat - 50.0).abs() < 1e-9, "lat {}", lat);
        assert!((lon - 10.0).abs() < 1e-9, "lon {}", lon);
    }

    #[test]
    fn test_roundtrip_with_angle() {
        let proj = RotatedLatLon::new(-35.0, -15.0, 12.5);
        let (x, y) = proj.lat_lon_to_proj(52.0, 4.0).unwrap();
        let (lat, lon) = proj.proj_to_lat_lon(x, y).unwrap();
        assert!((lat - 52.0).abs() < 1e-9);
        assert!((lon - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_north_pole_attribute() {
        let proj = RotatedLatLon::new(-40.0, 10.0, 0.0);
        assert_eq!(proj.north_pole(), (40.0, -170.0));
    }
}
