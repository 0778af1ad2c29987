//! Horizontal coordinate systems.
//!
//! One [`HorizontalCoordSys`] is built per grid definition. It resolves the
//! projection, generates the two 1-D axes and, for space-view grids, the 2-D
//! latitude/longitude fields, and collects the grid-mapping attributes.

use crate::config::SynthesisConfig;
use crate::error::{Result, SynthesisError};
use grid_common::{keys, Attribute, AttributeValue, GridDefinition};
use grid_record::{GridFormat, GridTableLookup, ProjectionType};
use projection::{
    msg_corrected_spacing, scan_geometry, GaussianLatitudes, Geostationary, LambertConformal,
    MapProjection, Mercator, Orthographic, PolarStereographic, Projection, RotatedLatLon,
    ScanGridParams, VerticalPerspective, EARTH_RADIUS_KM, TRUE_SCALE_AT_60,
};
use tracing::debug;

/// MSG reference ellipsoid (metres).
const MSG_MAJOR_AXIS: f64 = 6_378_169.0;
const MSG_MINOR_AXIS: f64 = 6_356_583.8;

/// One coordinate axis of a horizontal grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub name: String,
    pub values: Vec<f64>,
    pub units: String,
    pub long_name: String,
    pub standard_name: String,
    /// `_CoordinateAxisType` value.
    pub axis_type: String,
}

impl Axis {
    fn generate(start: f64, increment: f64, count: usize) -> Vec<f64> {
        (0..count).map(|i| start + increment * i as f64).collect()
    }

    fn latitude(values: Vec<f64>) -> Self {
        Self {
            name: "lat".to_string(),
            values,
            units: "degrees_north".to_string(),
            long_name: "latitude coordinate".to_string(),
            standard_name: "latitude".to_string(),
            axis_type: "Lat".to_string(),
        }
    }

    fn longitude(values: Vec<f64>) -> Self {
        Self {
            name: "lon".to_string(),
            values,
            units: "degrees_east".to_string(),
            long_name: "longitude coordinate".to_string(),
            standard_name: "longitude".to_string(),
            axis_type: "Lon".to_string(),
        }
    }

    fn projected(axis: char, values: Vec<f64>, angular: bool) -> Self {
        let (units, standard_name, long_name) = match (angular, axis) {
            (true, 'x') => ("degrees", "grid_longitude", "x coordinate of rotated grid"),
            (true, _) => ("degrees", "grid_latitude", "y coordinate of rotated grid"),
            (false, 'x') => ("km", "projection_x_coordinate", "x coordinate of projection"),
            (false, _) => ("km", "projection_y_coordinate", "y coordinate of projection"),
        };
        Self {
            name: axis.to_string(),
            values,
            units: units.to_string(),
            long_name: long_name.to_string(),
            standard_name: standard_name.to_string(),
            axis_type: if axis == 'x' { "GeoX" } else { "GeoY" }.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Latitude and longitude of every grid point, row-major over (y, x).
/// Points off the visible disk are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct LatLon2d {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

/// A horizontal grid with its resolved projection and axes.
#[derive(Debug, Clone)]
pub struct HorizontalCoordSys {
    /// Definition key records route on.
    pub key: String,
    pub definition: GridDefinition,
    pub grid_name: String,
    pub shape_name: String,
    pub projection_type: ProjectionType,
    /// `None` for lat/lon and Gaussian grids.
    pub projection: Option<Projection>,
    pub y: Axis,
    pub x: Axis,
    pub lat_lon_2d: Option<LatLon2d>,
    /// Quadrature weights of the selected Gaussian rows.
    pub gaussian_weights: Option<Vec<f64>>,
    pub earth_radius_km: f64,
    pub mapping_attributes: Vec<Attribute>,
}

impl HorizontalCoordSys {
    /// Build the coordinate system for one grid definition.
    pub fn build(
        definition: &GridDefinition,
        lookup: &dyn GridTableLookup,
        config: &SynthesisConfig,
    ) -> Result<Self> {
        let key = definition.key().to_string();
        let projection_type = lookup.projection_type(definition);
        let earth_radius_km = earth_radius_km(definition, lookup.format());
        let nx = definition.nx()?;
        let ny = definition.ny()?;

        let mut gaussian_weights = None;
        let (projection, y, x) = match projection_type {
            ProjectionType::LatLon => {
                let (y, x) = lat_lon_axes(definition, nx, ny)?;
                (None, Axis::latitude(y), Axis::longitude(x))
            }
            ProjectionType::GaussianLatLon => {
                let (lats, weights) = gaussian_rows(definition, ny)?;
                let (_, x) = lat_lon_axes(definition, nx, ny)?;
                gaussian_weights = Some(weights);
                (None, Axis::latitude(lats), Axis::longitude(x))
            }
            ProjectionType::RotatedLatLon => {
                let proj = RotatedLatLon::new(
                    definition.require_f64(keys::SP_LAT)?,
                    definition.require_f64(keys::SP_LON)?,
                    definition.get_f64(keys::ROTATION_ANGLE).unwrap_or(0.0),
                );
                let (y, x) = lat_lon_axes(definition, nx, ny)?;
                (
                    Some(Projection::RotatedLatLon(proj)),
                    Axis::projected('y', y, true),
                    Axis::projected('x', x, true),
                )
            }
            ProjectionType::LambertConformal
            | ProjectionType::PolarStereographic
            | ProjectionType::Mercator => {
                let proj = planar_projection(definition, projection_type, earth_radius_km)?;
                let (y, x) = projected_axes(definition, &proj, nx, ny)?;
                (
                    Some(proj),
                    Axis::projected('y', y, false),
                    Axis::projected('x', x, false),
                )
            }
            ProjectionType::Orthographic | ProjectionType::VerticalPerspective => {
                let (proj, y, x) = space_view(definition, projection_type, earth_radius_km, nx, ny)?;
                (
                    Some(proj),
                    Axis::projected('y', y, false),
                    Axis::projected('x', x, false),
                )
            }
            ProjectionType::MsgGeostationary => {
                let (proj, y, x) = msg_view(definition, config.apply_msg_correction, nx, ny)?;
                (
                    Some(proj),
                    Axis::projected('y', y, false),
                    Axis::projected('x', x, false),
                )
            }
            ProjectionType::Unknown(code) => {
                return Err(SynthesisError::unsupported(key, format!("grid template {}", code)));
            }
        };

        let lat_lon_2d = projection.as_ref().and_then(|proj| {
            (proj.is_curvilinear_view() || config.add_lat_lon_2d)
                .then(|| lat_lon_fields(proj, &y.values, &x.values))
        });

        let shape_name = lookup.shape_name(definition);
        let mapping_attributes = mapping_attributes(
            definition,
            projection.as_ref(),
            &shape_name,
            earth_radius_km,
            lookup.format(),
            config.emit_grid_definition_params,
        );

        debug!(
            definition = %key,
            projection = ?projection_type,
            nx,
            ny,
            "Built horizontal coordinate system"
        );

        Ok(Self {
            key,
            definition: definition.clone(),
            grid_name: lookup.grid_name(definition),
            shape_name,
            projection_type,
            projection,
            y,
            x,
            lat_lon_2d,
            gaussian_weights,
            earth_radius_km,
            mapping_attributes,
        })
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Axes are geographic latitude/longitude.
    pub fn is_lat_lon(&self) -> bool {
        self.projection.is_none()
    }
}

/// Earth radius in km from the shape code (GRIB2 code table 3.2).
pub fn earth_radius_km(definition: &GridDefinition, format: GridFormat) -> f64 {
    let code = definition.get_i64(keys::SHAPE_CODE);
    match (format, code) {
        (GridFormat::Grib1, _) => 6367.47,
        (_, Some(0)) => 6367.47,
        (_, Some(1)) => definition
            .get_f64(keys::EARTH_RADIUS)
            .filter(|r| *r > 0.0)
            .map(|r| r / 1000.0)
            .unwrap_or(EARTH_RADIUS_KM),
        (_, Some(8)) => 6371.2,
        _ => EARTH_RADIUS_KM,
    }
}

fn is_spherical(definition: &GridDefinition, format: GridFormat) -> bool {
    match format {
        GridFormat::Grib1 => definition.get_i64(keys::SHAPE_CODE).unwrap_or(0) == 0,
        GridFormat::Grib2 => matches!(
            definition.get_i64(keys::SHAPE_CODE),
            Some(0) | Some(1) | Some(6) | Some(8)
        ),
    }
}

fn bad(definition: &GridDefinition, reason: impl Into<String>) -> SynthesisError {
    SynthesisError::bad_definition(definition.key(), reason)
}

/// Latitude and longitude axes in degrees from La1/Lo1 and the spacing.
///
/// Spacing is `Dx`/`Dy` when given, else derived from the last point. The
/// sign follows the last point, or the scanning mode when it is absent.
fn lat_lon_axes(definition: &GridDefinition, nx: usize, ny: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let scan = definition.scan_mode();
    let la1 = definition.require_f64(keys::LA1)?;
    let lo1 = definition.require_f64(keys::LO1)?;
    let la2 = definition.get_f64(keys::LA2);
    let lo2 = definition.get_f64(keys::LO2);

    let dy = match (definition.get_f64(keys::DY), la2) {
        (Some(dy), _) => dy.abs(),
        (None, Some(la2)) if ny > 1 => (la2 - la1).abs() / (ny - 1) as f64,
        _ if ny <= 1 => 0.0,
        _ => return Err(bad(definition, "no Dy and no last latitude")),
    };
    let north_to_south = match la2 {
        Some(la2) if la2 != la1 => la2 < la1,
        _ => !scan.j_positive,
    };
    let dy = if north_to_south { -dy } else { dy };

    let dx = match (definition.get_f64(keys::DX), lo2) {
        (Some(dx), _) => dx.abs(),
        (None, Some(lo2)) if nx > 1 => {
            let span = if scan.i_negative { lo1 - lo2 } else { lo2 - lo1 };
            let span = if span < 0.0 { span + 360.0 } else { span };
            span / (nx - 1) as f64
        }
        _ if nx <= 1 => 0.0,
        _ => return Err(bad(definition, "no Dx and no last longitude")),
    };
    let dx = if scan.i_negative { -dx } else { dx };

    Ok((Axis::generate(la1, dy, ny), Axis::generate(lo1, dx, nx)))
}

/// Gaussian latitude rows nearest the declared first and last latitudes.
fn gaussian_rows(definition: &GridDefinition, ny: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let parallels = definition
        .get_i64(keys::NUMBER_PARALLELS)
        .or_else(|| definition.get_i64(keys::NP))
        .filter(|n| *n > 0)
        .ok_or_else(|| bad(definition, "Gaussian grid without NumberParallels"))?;

    let table = GaussianLatitudes::new(2 * parallels as usize);
    let la1 = definition.require_f64(keys::LA1)?;
    let start = table
        .nearest_index(la1)
        .ok_or_else(|| bad(definition, "empty Gaussian latitude table"))?;

    // Table runs north to south: a larger end index means descending latitudes.
    let descending = match definition.get_f64(keys::LA2).and_then(|la2| table.nearest_index(la2)) {
        Some(end) if end != start => end > start,
        _ => !definition.scan_mode().j_positive,
    };

    let indices: Vec<usize> = if descending {
        (start..table.len()).take(ny).collect()
    } else {
        (0..=start).rev().take(ny).collect()
    };
    if indices.len() != ny {
        return Err(bad(
            definition,
            format!("{} Gaussian rows requested from row {}, table has {}", ny, start, table.len()),
        ));
    }

    let lats = indices.iter().map(|i| table.latitudes[*i]).collect();
    let weights = indices.iter().map(|i| table.weights[*i]).collect();
    Ok((lats, weights))
}

fn planar_projection(
    definition: &GridDefinition,
    projection_type: ProjectionType,
    radius: f64,
) -> Result<Projection> {
    Ok(match projection_type {
        ProjectionType::LambertConformal => {
            let latin1 = definition.require_f64(keys::LATIN1)?;
            let latin2 = definition.get_f64(keys::LATIN2).unwrap_or(latin1);
            let lov = definition.require_f64(keys::LOV)?;
            Projection::LambertConformal(LambertConformal::new(latin1, lov, latin1, latin2, radius)?)
        }
        ProjectionType::PolarStereographic => {
            let north = definition
                .get(keys::NP_PROJ)
                .map_or(true, |v| v.trim().eq_ignore_ascii_case("true"));
            let lov = definition.require_f64(keys::LOV)?;
            Projection::PolarStereographic(PolarStereographic::new(
                north,
                lov,
                TRUE_SCALE_AT_60,
                radius,
            )?)
        }
        _ => {
            let lo1 = definition.require_f64(keys::LO1)?;
            let latin = definition.get_f64(keys::LATIN).unwrap_or(0.0);
            Projection::Mercator(Mercator::new(lo1, latin, radius)?)
        }
    })
}

/// Axes of a planar projection in km.
///
/// The origin is the projected first grid point. Declared spacing (metres)
/// takes its sign from the scanning mode; derived spacing from the projected
/// last grid point.
fn projected_axes(
    definition: &GridDefinition,
    proj: &Projection,
    nx: usize,
    ny: usize,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let scan = definition.scan_mode();
    let la1 = definition.require_f64(keys::LA1)?;
    let lo1 = definition.require_f64(keys::LO1)?;
    let (x0, y0) = proj
        .lat_lon_to_proj(la1, lo1)
        .ok_or_else(|| bad(definition, "first grid point has no projected position"))?;

    let last = match (definition.get_f64(keys::LA2), definition.get_f64(keys::LO2)) {
        (Some(la2), Some(lo2)) => proj.lat_lon_to_proj(la2, lo2),
        _ => None,
    };

    let dx = match (definition.get_f64(keys::DX), last) {
        (Some(dx), _) => {
            let dx = dx.abs() / 1000.0;
            if scan.i_negative {
                -dx
            } else {
                dx
            }
        }
        (None, Some((x2, _))) if nx > 1 => (x2 - x0) / (nx - 1) as f64,
        _ if nx <= 1 => 0.0,
        _ => return Err(bad(definition, "no Dx and no projectable last grid point")),
    };
    let dy = match (definition.get_f64(keys::DY), last) {
        (Some(dy), _) => {
            let dy = dy.abs() / 1000.0;
            if scan.j_positive {
                dy
            } else {
                -dy
            }
        }
        (None, Some((_, y2))) if ny > 1 => (y2 - y0) / (ny - 1) as f64,
        _ if ny <= 1 => 0.0,
        _ => return Err(bad(definition, "no Dy and no projectable last grid point")),
    };

    Ok((Axis::generate(y0, dy, ny), Axis::generate(x0, dx, nx)))
}

/// Orthographic and vertical perspective views centred on the sub-satellite point.
///
/// `Dx`/`Dy` are the apparent diameter of the earth in grid lengths and
/// `Xp`/`Yp` the sub-satellite position in grid lengths.
fn space_view(
    definition: &GridDefinition,
    projection_type: ProjectionType,
    radius: f64,
    nx: usize,
    ny: usize,
) -> Result<(Projection, Vec<f64>, Vec<f64>)> {
    let lap = definition.get_f64(keys::LAP).unwrap_or(0.0);
    let lop = definition.require_f64(keys::LOP)?;
    let (proj, disk_diameter) = if projection_type == ProjectionType::VerticalPerspective {
        let nr = definition.require_f64(keys::NR)?;
        let height = (nr - 1.0) * radius;
        let proj = VerticalPerspective::new(lap, lop, radius, height)?;
        let horizon = radius * ((nr - 1.0) / (nr + 1.0)).sqrt();
        (Projection::VerticalPerspective(proj), 2.0 * horizon)
    } else {
        (Projection::Orthographic(Orthographic::new(lap, lop, radius)), 2.0 * radius)
    };

    let apparent_dx = definition.require_f64(keys::DX)?;
    let apparent_dy = definition.require_f64(keys::DY)?;
    if apparent_dx <= 0.0 || apparent_dy <= 0.0 {
        return Err(bad(definition, "apparent earth diameter must be positive"));
    }
    let incr_x = disk_diameter / apparent_dx;
    let incr_y = disk_diameter / apparent_dy;
    let xp = definition.get_f64(keys::XP).unwrap_or((nx as f64 - 1.0) / 2.0);
    let yp = definition.get_f64(keys::YP).unwrap_or((ny as f64 - 1.0) / 2.0);

    let x = Axis::generate(-xp * incr_x, incr_x, nx);
    let y = if definition.scan_mode().j_positive {
        Axis::generate(-yp * incr_y, incr_y, ny)
    } else {
        Axis::generate(yp * incr_y, -incr_y, ny)
    };
    Ok((proj, y, x))
}

/// EUMETSAT MSG fixed-view navigation.
fn msg_view(
    definition: &GridDefinition,
    apply_correction: bool,
    nx: usize,
    ny: usize,
) -> Result<(Projection, Vec<f64>, Vec<f64>)> {
    let major_axis = axis_metres(definition.get_f64(keys::MAJOR_AXIS), MSG_MAJOR_AXIS);
    let minor_axis = axis_metres(definition.get_f64(keys::MINOR_AXIS), MSG_MINOR_AXIS);
    let nr = definition.require_f64(keys::NR)?;
    let declared_dx = definition.require_f64(keys::DX)?;
    let declared_dy = definition.require_f64(keys::DY)?;

    let (dx, dy) = if apply_correction {
        let corrected = msg_corrected_spacing(declared_dy);
        debug!(
            definition = %definition.key(),
            declared_dx,
            declared_dy,
            dx = corrected.0,
            dy = corrected.1,
            "Applied MSG spacing correction"
        );
        corrected
    } else {
        (declared_dx, declared_dy)
    };

    let params = ScanGridParams {
        nr,
        dx,
        dy,
        xp: definition.require_f64(keys::XP)?,
        yp: definition.require_f64(keys::YP)?,
        ny,
        major_axis,
        y_scan_positive: definition.scan_mode().j_positive,
    };
    let geometry = scan_geometry(&params)?;
    let lop = definition.get_f64(keys::LOP).unwrap_or(0.0);
    let proj = Geostationary::new(
        lop,
        major_axis,
        minor_axis,
        nr * major_axis,
        false,
        geometry.scale_factor,
        geometry.scale_factor,
    )?;

    Ok((
        Projection::Geostationary(proj),
        Axis::generate(geometry.start_y, geometry.incr_y, ny),
        Axis::generate(geometry.start_x, geometry.incr_x, nx),
    ))
}

/// Ellipsoid axis in metres; small values are taken as kilometres.
fn axis_metres(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v > 0.0 && v < 100_000.0 => v * 1000.0,
        Some(v) if v > 0.0 => v,
        _ => default,
    }
}

/// Inverse-project every (y, x) pair.
fn lat_lon_fields(proj: &Projection, y: &[f64], x: &[f64]) -> LatLon2d {
    let mut lat = Vec::with_capacity(y.len() * x.len());
    let mut lon = Vec::with_capacity(y.len() * x.len());
    for yv in y {
        for xv in x {
            match proj.proj_to_lat_lon(*xv, *yv) {
                Some((la, lo)) if la.is_finite() && lo.is_finite() => {
                    lat.push(la);
                    lon.push(lo);
                }
                _ => {
                    lat.push(f64::NAN);
                    lon.push(f64::NAN);
                }
            }
        }
    }
    LatLon2d { lat, lon }
}

fn mapping_attributes(
    definition: &GridDefinition,
    projection: Option<&Projection>,
    shape_name: &str,
    radius_km: f64,
    format: GridFormat,
    copy_params: bool,
) -> Vec<Attribute> {
    let mut attrs = match projection {
        Some(proj) => proj.mapping_attributes(),
        None => vec![Attribute::new("grid_mapping_name", "latitude_longitude")],
    };
    attrs.push(Attribute::new("earth_shape", shape_name));
    if is_spherical(definition, format) {
        attrs.push(Attribute::new("spherical_earth_radius_meters", radius_km * 1000.0));
    }
    if copy_params {
        for (name, raw) in definition.params() {
            attrs.push(Attribute::new(
                format!("GridDefRecord_param_{}", name),
                AttributeValue::infer(raw),
            ));
        }
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_record::TableLookup;

    fn build(definition: &GridDefinition) -> Result<HorizontalCoordSys> {
        HorizontalCoordSys::build(definition, &TableLookup::grib2(), &SynthesisConfig::default())
    }

    fn global() -> GridDefinition {
        GridDefinition::new("global")
            .with_param(keys::GRID_TYPE, 0)
            .with_param(keys::NX, 360)
            .with_param(keys::NY, 181)
            .with_param(keys::LA1, 90.0)
            .with_param(keys::LO1, 0.0)
            .with_param(keys::LA2, -90.0)
            .with_param(keys::LO2, 359.0)
            .with_param(keys::SHAPE_CODE, 6)
    }

    #[test]
    fn test_lat_lon_derived_spacing() {
        let hcs = build(&global()).unwrap();
        assert!(hcs.is_lat_lon());
        assert_eq!(hcs.y.name, "lat");
        assert_eq!(hcs.ny(), 181);
        assert!((hcs.y.values[1] - 89.0).abs() < 1e-12);
        assert!((hcs.y.values[180] + 90.0).abs() < 1e-9);
        assert!((hcs.x.values[359] - 359.0).abs() < 1e-9);
        assert!(hcs.lat_lon_2d.is_none());
    }

    #[test]
    fn test_lat_lon_explicit_spacing_and_scan() {
        let gds = GridDefinition::new("g")
            .with_param(keys::GRID_TYPE, 0)
            .with_param(keys::NX, 4)
            .with_param(keys::NY, 3)
            .with_param(keys::LA1, 10.0)
            .with_param(keys::LO1, 20.0)
            .with_param(keys::DX, 0.5)
            .with_param(keys::DY, 0.25)
            .with_param(keys::SCAN_MODE, 64);
        let hcs = build(&gds).unwrap();
        assert_eq!(hcs.y.values, vec![10.0, 10.25, 10.5]);
        assert_eq!(hcs.x.values, vec![20.0, 20.5, 21.0, 21.5]);
    }

    #[test]
    fn test_grid_mapping_attributes() {
        let hcs = build(&global()).unwrap();
        let attrs = &hcs.mapping_attributes;
        assert_eq!(
            Attribute::find(attrs, "grid_mapping_name"),
            Some(&AttributeValue::from("latitude_longitude"))
        );
        let radius = Attribute::find(attrs, "spherical_earth_radius_meters")
            .and_then(AttributeValue::as_f64)
            .unwrap();
        assert!((radius - 6_371_229.0).abs() < 1e-6);
        assert_eq!(
            Attribute::find(attrs, "GridDefRecord_param_Nx"),
            Some(&AttributeValue::Int(360))
        );
    }

    #[test]
    fn test_unsupported_projection() {
        let gds = global().with_param(keys::GRID_TYPE, 204);
        assert!(matches!(
            build(&gds),
            Err(SynthesisError::UnsupportedProjection { .. })
        ));
    }

    #[test]
    fn test_gaussian_requires_parallels() {
        let gds = global().with_param(keys::GRID_TYPE, 40);
        assert!(matches!(
            build(&gds),
            Err(SynthesisError::BadGridDefinition { .. })
        ));
    }

    #[test]
    fn test_gaussian_rows() {
        let gds = GridDefinition::new("t62")
            .with_param(keys::GRID_TYPE, 40)
            .with_param(keys::NX, 192)
            .with_param(keys::NY, 94)
            .with_param(keys::LA1, 88.542)
            .with_param(keys::LO1, 0.0)
            .with_param(keys::LA2, -88.542)
            .with_param(keys::DX, 1.875)
            .with_param(keys::NUMBER_PARALLELS, 47);
        let hcs = build(&gds).unwrap();
        assert_eq!(hcs.ny(), 94);
        assert!(hcs.y.values[0] > hcs.y.values[93]);
        let weights = hcs.gaussian_weights.unwrap();
        let sum: f64 = weights.iter().sum();
        assert!((sum - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_polar_stereographic_origin() {
        let gds = GridDefinition::new("ps")
            .with_param(keys::GRID_TYPE, 20)
            .with_param(keys::NX, 10)
            .with_param(keys::NY, 10)
            .with_param(keys::LA1, 90.0)
            .with_param(keys::LO1, 0.0)
            .with_param(keys::LOV, -105.0)
            .with_param(keys::DX, 47625.0)
            .with_param(keys::DY, 47625.0)
            .with_param(keys::SCAN_MODE, 64);
        let hcs = build(&gds).unwrap();
        assert!(hcs.x.values[0].abs() < 1e-9);
        assert!((hcs.x.values[1] - 47.625).abs() < 1e-9);
        assert_eq!(hcs.x.units, "km");
        match hcs.projection {
            Some(Projection::PolarStereographic(ref ps)) => assert!(ps.is_north()),
            ref other => panic!("unexpected projection {:?}", other),
        }
    }

    #[test]
    fn test_earth_radius_by_shape() {
        let gds = GridDefinition::new("g");
        assert_eq!(earth_radius_km(&gds.clone().with_param(keys::SHAPE_CODE, 0), GridFormat::Grib2), 6367.47);
        assert_eq!(
            earth_radius_km(
                &gds.clone()
                    .with_param(keys::SHAPE_CODE, 1)
                    .with_param(keys::EARTH_RADIUS, 6_371_000.0),
                GridFormat::Grib2
            ),
            6371.0
        );
        assert_eq!(earth_radius_km(&gds, GridFormat::Grib2), EARTH_RADIUS_KM);
    }

    fn lambert(spacing: bool) -> GridDefinition {
        let gds = GridDefinition::new("lc")
            .with_param(keys::GRID_TYPE, 30)
            .with_param(keys::NX, 5)
            .with_param(keys::NY, 4)
            .with_param(keys::LA1, 21.138123)
            .with_param(keys::LO1, 237.280472)
            .with_param(keys::LOV, 262.5)
            .with_param(keys::LATIN1, 38.5)
            .with_param(keys::LATIN2, 38.5)
            .with_param(keys::SCAN_MODE, 64)
            .with_param(keys::SHAPE_CODE, 6);
        if spacing {
            gds.with_param(keys::DX, 3000.0).with_param(keys::DY, 3000.0)
        } else {
            gds
        }
    }

    #[test]
    fn test_projected_spacing_from_corners() {
        let declared = build(&lambert(true)).unwrap();
        assert!((declared.x.values[1] - declared.x.values[0] - 3.0).abs() < 1e-12);
        let proj = declared.projection.as_ref().unwrap();
        let (la2, lo2) = proj
            .proj_to_lat_lon(declared.x.values[4], declared.y.values[3])
            .unwrap();

        let derived = build(&lambert(false).with_param(keys::LA2, la2).with_param(keys::LO2, lo2)).unwrap();
        for (d, e) in derived.x.values.iter().zip(&declared.x.values) {
            assert!((d - e).abs() < 1e-6, "x {} vs {}", d, e);
        }
        for (d, e) in derived.y.values.iter().zip(&declared.y.values) {
            assert!((d - e).abs() < 1e-6, "y {} vs {}", d, e);
        }
    }

    #[test]
    fn test_projected_spacing_requires_corner() {
        assert!(matches!(
            build(&lambert(false)),
            Err(SynthesisError::BadGridDefinition { .. })
        ));
    }

    #[test]
    fn test_mercator_build() {
        let gds = GridDefinition::new("merc")
            .with_param(keys::GRID_TYPE, 10)
            .with_param(keys::NX, 4)
            .with_param(keys::NY, 3)
            .with_param(keys::LA1, 0.0)
            .with_param(keys::LO1, -100.0)
            .with_param(keys::LATIN, 20.0)
            .with_param(keys::DX, 10000.0)
            .with_param(keys::DY, 10000.0)
            .with_param(keys::SCAN_MODE, 64)
            .with_param(keys::SHAPE_CODE, 6);
        let hcs = build(&gds).unwrap();
        assert!(!hcs.is_lat_lon());
        assert!(hcs.x.values[0].abs() < 1e-9);
        assert!(hcs.y.values[0].abs() < 1e-9);
        assert!((hcs.x.values[3] - 30.0).abs() < 1e-9);
        assert!((hcs.y.values[2] - 20.0).abs() < 1e-9);
        assert_eq!(hcs.y.standard_name, "projection_y_coordinate");
        assert_eq!(
            Attribute::find(&hcs.mapping_attributes, "grid_mapping_name"),
            Some(&AttributeValue::from("mercator"))
        );
        assert_eq!(
            Attribute::find(&hcs.mapping_attributes, "standard_parallel").and_then(AttributeValue::as_f64),
            Some(20.0)
        );
    }

    #[test]
    fn test_rotated_lat_lon_build() {
        let gds = GridDefinition::new("rot")
            .with_param(keys::GRID_TYPE, 1)
            .with_param(keys::NX, 3)
            .with_param(keys::NY, 2)
            .with_param(keys::LA1, -10.0)
            .with_param(keys::LO1, -10.0)
            .with_param(keys::DX, 0.5)
            .with_param(keys::DY, 0.5)
            .with_param(keys::SCAN_MODE, 64)
            .with_param(keys::SP_LAT, -30.0)
            .with_param(keys::SP_LON, 15.0);
        let hcs = build(&gds).unwrap();
        assert_eq!(hcs.x.values, vec![-10.0, -9.5, -9.0]);
        assert_eq!(hcs.y.values, vec![-10.0, -9.5]);
        assert_eq!(hcs.x.units, "degrees");
        assert_eq!(hcs.x.standard_name, "grid_longitude");
        assert!(matches!(hcs.projection, Some(Projection::RotatedLatLon(_))));
        assert_eq!(
            Attribute::find(&hcs.mapping_attributes, "grid_mapping_name"),
            Some(&AttributeValue::from("rotated_latitude_longitude"))
        );
    }

    #[test]
    fn test_rotated_requires_pole() {
        let gds = global().with_param(keys::GRID_TYPE, 1);
        assert!(matches!(build(&gds), Err(SynthesisError::Definition(_))));
    }
}
