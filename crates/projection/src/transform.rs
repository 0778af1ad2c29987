//! The projection trait and the closed set of supported projections.

use crate::geostationary::Geostationary;
use crate::lambert::LambertConformal;
use crate::mercator::Mercator;
use crate::perspective::{Orthographic, VerticalPerspective};
use crate::polar::PolarStereographic;
use crate::rotated::RotatedLatLon;
use grid_common::Attribute;
use num_traits::Float;

/// Mean earth radius used by spherical projections (km).
pub const EARTH_RADIUS_KM: f64 = 6371.229;

/// A forward/inverse map projection.
///
/// Projection coordinates are kilometres for planar projections, degrees for
/// the rotated pole grid. Geographic inputs and outputs are degrees as
/// `(lat, lon)`.
pub trait MapProjection {
    /// CF `grid_mapping_name`.
    fn grid_mapping_name(&self) -> &'static str;

    /// Geographic to projection coordinates. `None` when the point has no image.
    fn lat_lon_to_proj(&self, lat: f64, lon: f64) -> Option<(f64, f64)>;

    /// Projection to geographic coordinates. `None` when off the projection domain.
    fn proj_to_lat_lon(&self, x: f64, y: f64) -> Option<(f64, f64)>;

    /// CF grid-mapping attributes, starting with `grid_mapping_name`.
    fn mapping_attributes(&self) -> Vec<Attribute>;

    /// True when projection coordinates are angular degrees rather than kilometres.
    fn is_angular(&self) -> bool {
        false
    }
}

/// Every projection the horizontal builder can produce.
#[derive(Debug, Clone)]
pub enum Projection {
    LambertConformal(LambertConformal),
    PolarStereographic(PolarStereographic),
    Mercator(Mercator),
    RotatedLatLon(RotatedLatLon),
    Orthographic(Orthographic),
    VerticalPerspective(VerticalPerspective),
    Geostationary(Geostationary),
}

impl Projection {
    fn inner(&self) -> &dyn MapProjection {
        match self {
            Self::LambertConformal(p) => p,
            Self::PolarStereographic(p) => p,
            Self::Mercator(p) => p,
            Self::RotatedLatLon(p) => p,
            Self::Orthographic(p) => p,
            Self::VerticalPerspective(p) => p,
            Self::Geostationary(p) => p,
        }
    }

    /// True for projections whose grids are best described by 2-D lat/lon fields.
    pub fn is_curvilinear_view(&self) -> bool {
        matches!(
            self,
            Self::Orthographic(_) | Self::VerticalPerspective(_) | Self::Geostationary(_)
        )
    }
}

impl MapProjection for Projection {
    fn grid_mapping_name(&self) -> &'static str {
        self.inner().grid_mapping_name()
    }

    fn lat_lon_to_proj(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        self.inner().lat_lon_to_proj(lat, lon)
    }

    fn proj_to_lat_lon(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.inner().proj_to_lat_lon(x, y)
    }

    fn mapping_attributes(&self) -> Vec<Attribute> {
        self.inner().mapping_attributes()
    }

    fn is_angular(&self) -> bool {
        self.inner().is_angular()
    }
}

/// Wrap a longitude difference into `[-180, 180)` degrees.
pub fn normalize_longitude<T: Float>(lon: T) -> T {
    let full = T::from(360.0).unwrap_or_else(T::zero);
    let half = T::from(180.0).unwrap_or_else(T::zero);
    let wrapped = (lon + half) % full;
    if wrapped < T::zero() {
        wrapped + full - half
    } else {
        wrapped - half
    }
}

/// Wrap a longitude difference into `[-PI, PI)` radians.
pub fn normalize_radians<T: Float>(lon: T) -> T {
    normalize_longitude(lon.to_degrees()).to_radians()
}
