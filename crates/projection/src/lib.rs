//! Map projections for grid coordinate synthesis.
//!
//! Spherical projections work in kilometres on a sphere of radius
//! [`EARTH_RADIUS_KM`] unless the caller supplies another radius. The
//! geostationary projection works on an ellipsoid.

pub mod error;
pub mod gaussian;
pub mod geostationary;
pub mod lambert;
pub mod mercator;
pub mod perspective;
pub mod polar;
pub mod rotated;
pub mod transform;

pub use error::{ProjectionError, Result};
pub use gaussian::GaussianLatitudes;
pub use geostationary::{msg_corrected_spacing, scan_geometry, Geostationary, ScanGeometry, ScanGridParams};
pub use lambert::LambertConformal;
pub use mercator::Mercator;
pub use perspective::{Orthographic, VerticalPerspective};
pub use polar::{PolarStereographic, TRUE_SCALE_AT_60};
pub use rotated::RotatedLatLon;
pub use transform::{normalize_longitude, MapProjection, Projection, EARTH_RADIUS_KM};
