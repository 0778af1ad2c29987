//! Format-specific semantic lookup.
//!
//! Every source format gets one [`GridTableLookup`] implementation, injected
//! once into the indexer. Records never carry their format; the lookup
//! decides what their codes mean.

use crate::error::{RecordError, Result};
use crate::record::{GridRecord, MISSING_LEVEL_TYPE};
use crate::tables::{GridParameter, GridTables, LevelEntry};
use chrono::{DateTime, Utc};
use grid_common::{keys, GridDefinition, TimeUnit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source format of a record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridFormat {
    Grib1,
    Grib2,
}

impl GridFormat {
    /// Display name, also used as the `file_format` attribute.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grib1 => "GRIB-1",
            Self::Grib2 => "GRIB-2",
        }
    }

    /// Prefix of format-specific attribute names (`GRIB2_param_number` ...).
    pub fn attribute_prefix(&self) -> &'static str {
        match self {
            Self::Grib1 => "GRIB1",
            Self::Grib2 => "GRIB2",
        }
    }
}

impl fmt::Display for GridFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GridFormat {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "grib1" | "1" => Ok(Self::Grib1),
            "grib2" | "2" => Ok(Self::Grib2),
            _ => Err(RecordError::UnknownFormat(s.to_string())),
        }
    }
}

/// Projection family of a grid definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionType {
    LatLon,
    GaussianLatLon,
    RotatedLatLon,
    LambertConformal,
    PolarStereographic,
    Mercator,
    Orthographic,
    VerticalPerspective,
    /// EUMETSAT MSG fixed-view navigation.
    MsgGeostationary,
    /// Template code without a known projection.
    Unknown(i64),
}

impl ProjectionType {
    /// Default grid name when the definition carries none.
    pub fn grid_name(&self) -> String {
        match self {
            Self::LatLon => "Latitude_Longitude".to_string(),
            Self::GaussianLatLon => "Gaussian_Latitude_Longitude".to_string(),
            Self::RotatedLatLon => "Rotated_Latitude_Longitude".to_string(),
            Self::LambertConformal => "Lambert_Conformal".to_string(),
            Self::PolarStereographic => "Polar_Stereographic".to_string(),
            Self::Mercator => "Mercator".to_string(),
            Self::Orthographic => "Orthographic".to_string(),
            Self::VerticalPerspective => "Vertical_Perspective".to_string(),
            Self::MsgGeostationary => "MSG_Geostationary".to_string(),
            Self::Unknown(code) => format!("Grid_template_{}", code),
        }
    }

    /// Axes in degrees rather than projection kilometres.
    pub fn is_lat_lon(&self) -> bool {
        matches!(self, Self::LatLon | Self::GaussianLatLon)
    }
}

/// Text used for the global provenance attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub center: Option<String>,
    pub process: Option<String>,
    pub product_status: Option<String>,
    pub product_type: Option<String>,
}

/// Semantic translations the indexer needs from a source format.
pub trait GridTableLookup: Send + Sync {
    fn format(&self) -> GridFormat;

    /// Format name, e.g. `"GRIB-2"`.
    fn grid_type(&self) -> &'static str {
        self.format().name()
    }

    /// Name of a horizontal grid.
    fn grid_name(&self, gds: &GridDefinition) -> String;

    /// Description of the earth shape assumed by a grid.
    fn shape_name(&self, gds: &GridDefinition) -> String;

    fn projection_type(&self, gds: &GridDefinition) -> ProjectionType;

    fn parameter(&self, record: &GridRecord) -> GridParameter;

    fn level_name(&self, record: &GridRecord) -> String;

    fn level_description(&self, record: &GridRecord) -> String;

    fn level_unit(&self, record: &GridRecord) -> String;

    /// False for level types with a single fixed value (surface, msl ...).
    fn is_vertical_coordinate(&self, record: &GridRecord) -> bool;

    fn is_positive_up(&self, record: &GridRecord) -> bool;

    /// Level is a bounded layer between two surfaces.
    fn is_layer(&self, record: &GridRecord) -> bool;

    /// Level is a hybrid sigma-pressure level.
    fn is_hybrid(&self, record: &GridRecord) -> bool;

    /// Value readers fill missing slots with.
    fn missing_value(&self) -> f32;

    /// Model run time, when known independently of the records.
    fn base_time(&self) -> Option<DateTime<Utc>>;

    /// Unit name used in time coordinate units (`"hour"` in `"hours since ..."`).
    fn time_range_unit_name(&self, unit: TimeUnit) -> String {
        unit.name().to_string()
    }

    fn provenance(&self) -> Provenance;
}

/// GRIB-1 level types that describe a layer between two surfaces.
const GRIB1_LAYER_TYPES: &[i32] = &[
    101, 104, 106, 108, 110, 112, 114, 116, 120, 121, 128, 141,
];

/// Default missing value for GRIB data.
pub const DEFAULT_MISSING_VALUE: f32 = -9999.0;

/// Table-driven lookup for GRIB-1 and GRIB-2.
#[derive(Debug, Clone)]
pub struct TableLookup {
    format: GridFormat,
    tables: GridTables,
    base_time: Option<DateTime<Utc>>,
    provenance: Provenance,
    missing_value: f32,
}

impl TableLookup {
    /// Lookup over explicit tables.
    pub fn new(format: GridFormat, tables: GridTables) -> Self {
        Self {
            format,
            tables,
            base_time: None,
            provenance: Provenance::default(),
            missing_value: DEFAULT_MISSING_VALUE,
        }
    }

    /// Lookup with the built-in tables for `format`.
    pub fn for_format(format: GridFormat) -> Self {
        let tables = match format {
            GridFormat::Grib1 => GridTables::grib1(),
            GridFormat::Grib2 => GridTables::grib2(),
        };
        Self::new(format, tables)
    }

    pub fn grib1() -> Self {
        Self::for_format(GridFormat::Grib1)
    }

    pub fn grib2() -> Self {
        Self::for_format(GridFormat::Grib2)
    }

    pub fn with_base_time(mut self, base_time: DateTime<Utc>) -> Self {
        self.base_time = Some(base_time);
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn with_missing_value(mut self, missing_value: f32) -> Self {
        self.missing_value = missing_value;
        self
    }

    pub fn tables(&self) -> &GridTables {
        &self.tables
    }

    pub fn tables_mut(&mut self) -> &mut GridTables {
        &mut self.tables
    }

    fn level(&self, record: &GridRecord) -> LevelEntry {
        self.tables.level(record.level_type1)
    }

    fn grib2_projection(gds: &GridDefinition) -> ProjectionType {
        match gds.grid_type() {
            0 => ProjectionType::LatLon,
            1 => ProjectionType::RotatedLatLon,
            10 => ProjectionType::Mercator,
            20 => ProjectionType::PolarStereographic,
            30 => ProjectionType::LambertConformal,
            40 => ProjectionType::GaussianLatLon,
            90 => Self::space_view(gds),
            other => ProjectionType::Unknown(other),
        }
    }

    fn grib1_projection(gds: &GridDefinition) -> ProjectionType {
        match gds.grid_type() {
            0 => ProjectionType::LatLon,
            1 => ProjectionType::Mercator,
            3 => ProjectionType::LambertConformal,
            4 => ProjectionType::GaussianLatLon,
            5 => ProjectionType::PolarStereographic,
            10 => ProjectionType::RotatedLatLon,
            90 => Self::space_view(gds),
            other => ProjectionType::Unknown(other),
        }
    }

    /// Space view grids: EUMETSAT products use the MSG navigation, others are
    /// orthographic when the camera is at infinity (Nr absent or zero).
    fn space_view(gds: &GridDefinition) -> ProjectionType {
        if gds.center() == Some(254) {
            return ProjectionType::MsgGeostationary;
        }
        match gds.get_f64(keys::NR) {
            Some(nr) if nr > 0.0 => ProjectionType::VerticalPerspective,
            _ => ProjectionType::Orthographic,
        }
    }
}

impl GridTableLookup for TableLookup {
    fn format(&self) -> GridFormat {
        self.format
    }

    fn grid_name(&self, gds: &GridDefinition) -> String {
        gds.get("name")
            .filter(|n| !n.trim().is_empty())
            .map(|n| n.trim().replace(' ', "_"))
            .unwrap_or_else(|| self.projection_type(gds).grid_name())
    }

    fn shape_name(&self, gds: &GridDefinition) -> String {
        let code = gds.get_i64(keys::SHAPE_CODE).unwrap_or(0);
        match self.format {
            GridFormat::Grib2 => match code {
                0 => "Earth spherical with radius = 6,367,470 m",
                1 => "Earth spherical with radius specified by data producer",
                2 => "Earth oblate spheroid with size as determined by IAU in 1965",
                3 => "Earth oblate spheroid with major and minor axes specified by data producer (km)",
                4 => "Earth oblate spheroid as defined in IAG-GRS80 model",
                5 => "Earth assumed to be represented by WGS84",
                6 => "Earth spherical with radius of 6,371,229.0 m",
                7 => "Earth oblate spheroid with major and minor axes specified by data producer (m)",
                8 => "Earth spherical with radius of 6,371,200 m",
                _ => "Unknown Earth Shape",
            }
            .to_string(),
            GridFormat::Grib1 => match code {
                1 => "oblate spheroid as determined by IAU in 1965",
                _ => "spherical earth with radius of 6367.47 km",
            }
            .to_string(),
        }
    }

    fn projection_type(&self, gds: &GridDefinition) -> ProjectionType {
        match self.format {
            GridFormat::Grib1 => Self::grib1_projection(gds),
            GridFormat::Grib2 => Self::grib2_projection(gds),
        }
    }

    fn parameter(&self, record: &GridRecord) -> GridParameter {
        self.tables.parameter(record.parameter)
    }

    fn level_name(&self, record: &GridRecord) -> String {
        self.level(record).name
    }

    fn level_description(&self, record: &GridRecord) -> String {
        self.level(record).description
    }

    fn level_unit(&self, record: &GridRecord) -> String {
        self.level(record).units
    }

    fn is_vertical_coordinate(&self, record: &GridRecord) -> bool {
        self.level(record).vertical
    }

    fn is_positive_up(&self, record: &GridRecord) -> bool {
        self.level(record).positive_up
    }

    fn is_layer(&self, record: &GridRecord) -> bool {
        match self.format {
            GridFormat::Grib2 => {
                record.level_type1 != 0 && record.level_type2 != MISSING_LEVEL_TYPE
            }
            GridFormat::Grib1 => GRIB1_LAYER_TYPES.contains(&record.level_type1),
        }
    }

    fn is_hybrid(&self, record: &GridRecord) -> bool {
        self.level(record).hybrid
    }

    fn missing_value(&self) -> f32 {
        self.missing_value
    }

    fn base_time(&self) -> Option<DateTime<Utc>> {
        self.base_time
    }

    fn provenance(&self) -> Provenance {
        self.provenance.clone()
    }
}
