//! Horizontal grid definitions.
//!
//! A [`GridDefinition`] is the parsed form of a grid definition section: an
//! ordered bag of named string parameters plus the optional packed vertical
//! coordinate factors some grids carry. Decoders fill it in; the indexer only
//! reads from it.

use crate::error::{GridDefinitionError, GridDefinitionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known parameter names.
pub mod keys {
    /// Grid template / data representation type code.
    pub const GRID_TYPE: &str = "grid_type";
    /// Originating centre code.
    pub const CENTER: &str = "center";
    pub const NX: &str = "Nx";
    pub const NY: &str = "Ny";
    /// Latitude of first grid point (degrees).
    pub const LA1: &str = "La1";
    /// Longitude of first grid point (degrees).
    pub const LO1: &str = "Lo1";
    /// Latitude of last grid point (degrees).
    pub const LA2: &str = "La2";
    /// Longitude of last grid point (degrees).
    pub const LO2: &str = "Lo2";
    /// X spacing: degrees for lat/lon grids, metres for projected grids.
    pub const DX: &str = "Dx";
    /// Y spacing: degrees for lat/lon grids, metres for projected grids.
    pub const DY: &str = "Dy";
    /// Orientation longitude of a Lambert or polar stereographic grid.
    pub const LOV: &str = "LoV";
    pub const LATIN1: &str = "Latin1";
    pub const LATIN2: &str = "Latin2";
    /// Latitude where Mercator spacing is true.
    pub const LATIN: &str = "Latin";
    /// Number of parallels between a pole and the equator (Gaussian grids).
    pub const NUMBER_PARALLELS: &str = "NumberParallels";
    /// Older alias of [`NUMBER_PARALLELS`].
    pub const NP: &str = "Np";
    /// "true" when the polar stereographic projection centre is the north pole.
    pub const NP_PROJ: &str = "NpProj";
    pub const SP_LAT: &str = "SpLat";
    pub const SP_LON: &str = "SpLon";
    pub const ROTATION_ANGLE: &str = "RotationAngle";
    /// Sub-satellite latitude (degrees).
    pub const LAP: &str = "Lap";
    /// Sub-satellite longitude (degrees).
    pub const LOP: &str = "Lop";
    /// X coordinate of the sub-satellite point in grid lengths.
    pub const XP: &str = "Xp";
    /// Y coordinate of the sub-satellite point in grid lengths.
    pub const YP: &str = "Yp";
    /// Camera distance from the earth centre in units of the equatorial radius.
    pub const NR: &str = "Nr";
    pub const MAJOR_AXIS: &str = "major_axis_earth";
    pub const MINOR_AXIS: &str = "minor_axis_earth";
    pub const SHAPE_CODE: &str = "grid_shape_code";
    pub const EARTH_RADIUS: &str = "radius_spherical_earth";
    pub const SCAN_MODE: &str = "ScanningMode";
}

/// One horizontal grid definition.
///
/// Identity is the caller-chosen `key`, used only to route records into
/// horizontal groups. Two definitions with different keys are distinct even
/// when their parameters match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDefinition {
    key: String,
    #[serde(default)]
    params: BTreeMap<String, String>,
    /// Packed hybrid coordinate factors: all `a` values followed by all `b` values.
    #[serde(default)]
    vertical_coordinates: Vec<f64>,
}

impl GridDefinition {
    /// Create an empty definition.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            params: BTreeMap::new(),
            vertical_coordinates: Vec::new(),
        }
    }

    /// Builder-style parameter insertion.
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Builder-style packed vertical coordinate factors.
    pub fn with_vertical_coordinates(mut self, factors: Vec<f64>) -> Self {
        self.vertical_coordinates = factors;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw string value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Parameter parsed as a finite double. Unparseable or NaN values read as absent.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    /// Parameter parsed as an integer, accepting integral doubles such as `"361.0"`.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        let raw = self.get(name)?.trim();
        raw.parse::<i64>().ok().or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
        })
    }

    /// Required double parameter.
    pub fn require_f64(&self, name: &str) -> GridDefinitionResult<f64> {
        match self.get(name) {
            None => Err(GridDefinitionError::missing(&self.key, name)),
            Some(raw) => self
                .get_f64(name)
                .ok_or_else(|| GridDefinitionError::invalid(&self.key, name, raw)),
        }
    }

    /// Required non-negative count parameter.
    pub fn require_count(&self, name: &str) -> GridDefinitionResult<usize> {
        match self.get(name) {
            None => Err(GridDefinitionError::missing(&self.key, name)),
            Some(raw) => self
                .get_i64(name)
                .filter(|v| *v >= 0)
                .map(|v| v as usize)
                .ok_or_else(|| GridDefinitionError::invalid(&self.key, name, raw)),
        }
    }

    /// Number of points along x.
    pub fn nx(&self) -> GridDefinitionResult<usize> {
        self.require_count(keys::NX)
    }

    /// Number of points along y.
    pub fn ny(&self) -> GridDefinitionResult<usize> {
        self.require_count(keys::NY)
    }

    /// Grid template code, `-1` when absent.
    pub fn grid_type(&self) -> i64 {
        self.get_i64(keys::GRID_TYPE).unwrap_or(-1)
    }

    pub fn center(&self) -> Option<i64> {
        self.get_i64(keys::CENTER)
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.get_i64(keys::SCAN_MODE)
            .map(|flag| ScanMode::from_flag(flag as u8))
            .unwrap_or_else(ScanMode::standard)
    }

    pub fn vertical_coordinates(&self) -> &[f64] {
        &self.vertical_coordinates
    }

    /// Iterate parameters in key order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Scan mode flags for grid data ordering (GRIB2 flag table 3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMode {
    /// +i direction: false = +x (east), true = -x (west)
    pub i_negative: bool,
    /// +j direction: false = -y (south), true = +y (north)
    pub j_positive: bool,
    /// Adjacent points: false = i direction, true = j direction
    pub j_consecutive: bool,
    /// Row scan direction alternates
    pub alternating_rows: bool,
}

impl ScanMode {
    /// Rows west to east, columns north to south.
    pub fn standard() -> Self {
        Self {
            i_negative: false,
            j_positive: false,
            j_consecutive: false,
            alternating_rows: false,
        }
    }

    pub fn from_flag(flag: u8) -> Self {
        Self {
            i_negative: (flag & 0x80) != 0,
            j_positive: (flag & 0x40) != 0,
            j_consecutive: (flag & 0x20) != 0,
            alternating_rows: (flag & 0x10) != 0,
        }
    }
}

impl Default for ScanMode {
    fn default() -> Self {
        Self::standard()
    }
}
