//! Geostationary satellite projection.
//!
//! The satellite views the earth from a fixed position above the equator and
//! pixel positions are scan angles from nadir. Two sweep conventions exist:
//! GOES-R sweeps the x axis (PUG Volume 4, 4.2.8), Meteosat Second Generation
//! sweeps the y axis (CGMS LRIT/HRIT 4.4). Projection coordinates are scan
//! angles multiplied by a per-axis kilometre scale.

use crate::error::{ProjectionError, Result};
use crate::transform::{normalize_radians, MapProjection};
use grid_common::Attribute;

const NAME: &str = "geostationary";

/// Spacing override applied to EUMETSAT MSG products (pixels).
pub const MSG_LOW_RES_SPACING: (f64, f64) = (1207.0, 1203.0);
/// Spacing override for MSG 1-pixel (HRV) resolution products.
pub const MSG_HIGH_RES_SPACING: (f64, f64) = (3622.0, 3610.0);
/// Declared dy below this selects the low resolution override.
pub const MSG_SPACING_THRESHOLD: f64 = 2100.0;

/// Geostationary projection parameters.
#[derive(Debug, Clone)]
pub struct Geostationary {
    /// Satellite distance from the earth centre (metres)
    pub h: f64,
    /// Semi-major axis of the earth ellipsoid (metres)
    pub req: f64,
    /// Semi-minor axis of the earth ellipsoid (metres)
    pub rpol: f64,
    /// Longitude of the sub-satellite point (degrees)
    pub lambda_0: f64,
    /// Sweep angle axis ("x" for GOES-R, "y" for Meteosat/Himawari)
    pub sweep_x: bool,
    /// Kilometres per radian of x scan angle
    pub scale_x: f64,
    /// Kilometres per radian of y scan angle
    pub scale_y: f64,
}

impl Geostationary {
    /// Create a projection. `h` is measured from the earth centre.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        lambda_0: f64,
        req: f64,
        rpol: f64,
        h: f64,
        sweep_x: bool,
        scale_x: f64,
        scale_y: f64,
    ) -> Result<Self> {
        if req <= 0.0 || rpol <= 0.0 {
            return Err(ProjectionError::invalid(NAME, "semi_major_axis", "earth axes must be positive"));
        }
        if h <= req {
            return Err(ProjectionError::invalid(
                NAME,
                "perspective_point_height",
                format!("satellite at {} m is inside the earth", h),
            ));
        }
        if scale_x == 0.0 || scale_y == 0.0 {
            return Err(ProjectionError::invalid(NAME, "scale", "scan scale must be non-zero"));
        }
        Ok(Self {
            h,
            req,
            rpol,
            lambda_0,
            sweep_x,
            scale_x,
            scale_y,
        })
    }

    /// Height above the surface at the sub-satellite point (metres).
    pub fn perspective_point_height(&self) -> f64 {
        self.h - self.req
    }

    /// Convert scan angles (radians) to geographic `(lat, lon)` degrees.
    ///
    /// Returns None if the scan angle points to space (off earth).
    pub fn scan_to_geo(&self, x_rad: f64, y_rad: f64) -> Option<(f64, f64)> {
        let (sin_x, cos_x) = x_rad.sin_cos();
        let (sin_y, cos_y) = y_rad.sin_cos();
        let ratio = (self.req / self.rpol).powi(2);
        let c = self.h.powi(2) - self.req.powi(2);

        let (lat, lon) = if self.sweep_x {
            let a = sin_x.powi(2) + cos_x.powi(2) * (cos_y.powi(2) + ratio * sin_y.powi(2));
            let b = -2.0 * self.h * cos_x * cos_y;
            let discriminant = b * b - 4.0 * a * c;
            if discriminant < 0.0 {
                return None;
            }
            let rs = (-b - discriminant.sqrt()) / (2.0 * a);
            let sx = rs * cos_x * cos_y;
            let sy = -rs * sin_x;
            let sz = rs * cos_x * sin_y;
            let lat = (ratio * sz / (self.h - sx).hypot(sy)).atan();
            let lon = self.lambda_0.to_radians() - sy.atan2(self.h - sx);
            (lat, lon)
        } else {
            let a = cos_y.powi(2) + ratio * sin_y.powi(2);
            let b = self.h * cos_x * cos_y;
            let discriminant = b * b - a * c;
            if discriminant < 0.0 {
                return None;
            }
            let sn = (b - discriminant.sqrt()) / a;
            let s1 = self.h - sn * cos_x * cos_y;
            let s2 = sn * sin_x * cos_y;
            let s3 = sn * sin_y;
            let lat = (ratio * s3 / s1.hypot(s2)).atan();
            let lon = self.lambda_0.to_radians() + s2.atan2(s1);
            (lat, lon)
        };

        Some((lat.to_degrees(), lon.to_degrees()))
    }

    /// Convert geographic `(lat, lon)` degrees to scan angles (radians).
    ///
    /// Returns None if the point is not visible from the satellite.
    pub fn geo_to_scan(&self, lat_deg: f64, lon_deg: f64) -> Option<(f64, f64)> {
        let lat_rad = lat_deg.to_radians();
        let dlon = normalize_radians((lon_deg - self.lambda_0).to_radians());

        // Geocentric latitude
        let phi_c = ((self.rpol / self.req).powi(2) * lat_rad.tan()).atan();
        let e2 = 1.0 - (self.rpol / self.req).powi(2);
        let rc = self.rpol / (1.0 - e2 * phi_c.cos().powi(2)).sqrt();

        // The surface point must face the satellite.
        let px = rc * phi_c.cos() * dlon.cos();
        if self.h * px <= rc * rc {
            return None;
        }

        let r1 = self.h - px;
        let r2 = -rc * phi_c.cos() * dlon.sin();
        let r3 = rc * phi_c.sin();
        let rn = (r1 * r1 + r2 * r2 + r3 * r3).sqrt();

        if self.sweep_x {
            Some(((-r2 / rn).asin(), r3.atan2(r1)))
        } else {
            Some(((-r2).atan2(r1), (r3 / rn).asin()))
        }
    }
}

impl MapProjection for Geostationary {
    fn grid_mapping_name(&self) -> &'static str {
        NAME
    }

    fn lat_lon_to_proj(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        let (x, y) = self.geo_to_scan(lat, lon)?;
        Some((x * self.scale_x, y * self.scale_y))
    }

    fn proj_to_lat_lon(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.scan_to_geo(x / self.scale_x, y / self.scale_y)
    }

    fn mapping_attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::new("grid_mapping_name", NAME),
            Attribute::new("longitude_of_projection_origin", self.lambda_0),
            Attribute::new("latitude_of_projection_origin", 0.0),
            Attribute::new("perspective_point_height", self.perspective_point_height()),
            Attribute::new("semi_major_axis", self.req),
            Attribute::new("semi_minor_axis", self.rpol),
            Attribute::new("sweep_angle_axis", if self.sweep_x { "x" } else { "y" }),
        ]
    }
}

/// Scan geometry of a fixed-view satellite grid, in projection kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanGeometry {
    /// Kilometres per radian of scan angle.
    pub scale_factor: f64,
    /// Column scaling factor (pixels per radian).
    pub cfac: f64,
    /// Line scaling factor (pixels per radian).
    pub lfac: f64,
    pub start_x: f64,
    pub incr_x: f64,
    pub start_y: f64,
    pub incr_y: f64,
}

/// Inputs describing a fixed-view satellite grid.
#[derive(Debug, Clone, Copy)]
pub struct ScanGridParams {
    /// Camera distance from the earth centre in equatorial radii.
    pub nr: f64,
    /// Apparent earth diameter along x in pixels.
    pub dx: f64,
    /// Apparent earth diameter along y in pixels.
    pub dy: f64,
    /// Sub-satellite x position in grid lengths.
    pub xp: f64,
    /// Sub-satellite y position in grid lengths.
    pub yp: f64,
    pub ny: usize,
    /// Semi-major axis (metres).
    pub major_axis: f64,
    /// True when rows run south to north.
    pub y_scan_positive: bool,
}

/// Replace a declared MSG spacing with the calibrated constants.
pub fn msg_corrected_spacing(dy: f64) -> (f64, f64) {
    if dy < MSG_SPACING_THRESHOLD {
        MSG_LOW_RES_SPACING
    } else {
        MSG_HIGH_RES_SPACING
    }
}

/// Compute scan factors and axis origin/increment for a fixed-view grid.
pub fn scan_geometry(params: &ScanGridParams) -> Result<ScanGeometry> {
    if params.nr <= 1.0 || !params.nr.is_finite() {
        return Err(ProjectionError::invalid(
            NAME,
            "Nr",
            format!("camera distance {} is not outside the earth", params.nr),
        ));
    }
    let angular_diameter = 2.0 * (1.0 / params.nr).asin();
    let cfac = params.dx / angular_diameter;
    let lfac = params.dy / angular_diameter;
    let scale_factor = (params.nr - 1.0) * params.major_axis / 1000.0;

    let start_x = scale_factor * (1.0 - params.xp) / cfac;
    let incr_x = scale_factor / cfac;

    let base_y = scale_factor * (params.yp - params.ny as f64) / lfac;
    let (start_y, incr_y) = if params.y_scan_positive {
        (base_y, scale_factor / lfac)
    } else {
        let incr_y = -scale_factor / lfac;
        (base_y - incr_y * (params.ny as f64 - 1.0), incr_y)
    };

    Ok(ScanGeometry {
        scale_factor,
        cfac,
        lfac,
        start_x,
        incr_x,
        start_y,
        incr_y,
    })
}
