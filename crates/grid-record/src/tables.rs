//! Parameter and level lookup tables.
//!
//! Tables translate numeric codes into parameter names, descriptions and
//! units, and level types into names and vertical semantics. The built-in
//! tables cover the common WMO codes; model configuration files can add or
//! override entries.

use crate::record::ParameterId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameter metadata resolved for a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridParameter {
    /// Short name (e.g. "TMP").
    pub name: String,
    /// Descriptive name (e.g. "Temperature").
    pub description: String,
    pub unit: String,
}

impl GridParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            unit: unit.into(),
        }
    }
}

/// Semantics of one level type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelEntry {
    /// Short name used for vertical dimensions (e.g. "isobaric").
    pub name: String,
    /// Descriptive name (e.g. "Isobaric surface").
    pub description: String,
    pub units: String,
    /// False when the level does not vary (surface, mean sea level ...).
    pub vertical: bool,
    pub positive_up: bool,
    /// Hybrid sigma-pressure levels.
    #[serde(default)]
    pub hybrid: bool,
}

impl LevelEntry {
    /// A level type with a single fixed value.
    pub fn fixed(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            units: String::new(),
            vertical: false,
            positive_up: true,
            hybrid: false,
        }
    }

    /// A varying vertical coordinate.
    pub fn vertical(name: &str, description: &str, units: &str, positive_up: bool) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            units: units.to_string(),
            vertical: true,
            positive_up,
            hybrid: false,
        }
    }

    fn as_hybrid(mut self) -> Self {
        self.hybrid = true;
        self
    }
}

/// Parameter and level tables for one format.
#[derive(Debug, Clone, Default)]
pub struct GridTables {
    parameters: HashMap<ParameterId, GridParameter>,
    levels: HashMap<i32, LevelEntry>,
}

impl GridTables {
    /// Create empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter mapping.
    pub fn add_parameter(&mut self, id: ParameterId, parameter: GridParameter) {
        self.parameters.insert(id, parameter);
    }

    /// Add or replace a level type mapping.
    pub fn add_level(&mut self, level_type: i32, entry: LevelEntry) {
        self.levels.insert(level_type, entry);
    }

    /// Look up a parameter.
    ///
    /// Unknown parameters resolve to `"P{discipline}_{category}_{number}"` with
    /// a matching description and empty unit.
    pub fn parameter(&self, id: ParameterId) -> GridParameter {
        self.parameters.get(&id).cloned().unwrap_or_else(|| {
            let name = format!("P{}_{}_{}", id.discipline, id.category, id.number);
            GridParameter::new(name.clone(), name, "")
        })
    }

    /// Look up a level type. Unknown types are non-vertical and named `"level_type_{n}"`.
    pub fn level(&self, level_type: i32) -> LevelEntry {
        self.levels.get(&level_type).cloned().unwrap_or_else(|| LevelEntry {
            name: format!("level_type_{}", level_type),
            description: format!("Level type {}", level_type),
            units: String::new(),
            vertical: false,
            positive_up: true,
            hybrid: false,
        })
    }

    pub fn has_parameter(&self, id: ParameterId) -> bool {
        self.parameters.contains_key(&id)
    }

    pub fn has_level(&self, level_type: i32) -> bool {
        self.levels.contains_key(&level_type)
    }

    /// Get the number of parameters in the table
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Get the number of level types in the table
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Check if the tables are empty
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.levels.is_empty()
    }

    /// Merge `other` over `self`; entries in `other` win.
    pub fn merge(&mut self, other: GridTables) {
        self.parameters.extend(other.parameters);
        self.levels.extend(other.levels);
    }

    /// Built-in GRIB-2 tables (code tables 4.2 and 4.5, plus common NCEP local entries).
    pub fn grib2() -> Self {
        let mut tables = Self::new();
        for &((d, c, n), name, description, unit) in GRIB2_PARAMETERS {
            tables.add_parameter(
                ParameterId::new(d, c, n),
                GridParameter::new(name, description, unit),
            );
        }

        tables.add_level(1, LevelEntry::fixed("surface", "Ground or water surface"));
        tables.add_level(2, LevelEntry::fixed("cloud_base", "Cloud base level"));
        tables.add_level(3, LevelEntry::fixed("cloud_tops", "Level of cloud tops"));
        tables.add_level(4, LevelEntry::fixed("zeroDegC_isotherm", "Level of 0 degC isotherm"));
        tables.add_level(5, LevelEntry::fixed("adiabatic_condensation_lifted", "Level of adiabatic condensation lifted from the surface"));
        tables.add_level(6, LevelEntry::fixed("maximum_wind", "Maximum wind level"));
        tables.add_level(7, LevelEntry::fixed("tropopause", "Tropopause"));
        tables.add_level(8, LevelEntry::fixed("atmosphere_top", "Nominal top of the atmosphere"));
        tables.add_level(10, LevelEntry::fixed("entire_atmosphere_single_layer", "Entire atmosphere (considered as a single layer)"));
        tables.add_level(100, LevelEntry::vertical("isobaric", "Isobaric surface", "Pa", false));
        tables.add_level(101, LevelEntry::fixed("msl", "Mean sea level"));
        tables.add_level(102, LevelEntry::vertical("altitude_above_msl", "Specific altitude above mean sea level", "m", true));
        tables.add_level(103, LevelEntry::vertical("height_above_ground", "Specified height level above ground", "m", true));
        tables.add_level(104, LevelEntry::vertical("sigma", "Sigma level", "", false));
        tables.add_level(105, LevelEntry::vertical("hybrid", "Hybrid level", "", false).as_hybrid());
        tables.add_level(106, LevelEntry::vertical("depth_below_surface", "Depth below land surface", "m", false));
        tables.add_level(107, LevelEntry::vertical("isentrope", "Isentropic (theta) level", "K", true));
        tables.add_level(108, LevelEntry::vertical("pressure_difference", "Level at specified pressure difference from ground to level", "Pa", false));
        tables.add_level(109, LevelEntry::vertical("potential_vorticity_surface", "Potential vorticity surface", "K m2 kg-1 s-1", true));
        tables.add_level(111, LevelEntry::vertical("eta", "Eta level", "", false));
        tables.add_level(160, LevelEntry::vertical("depth_below_sea", "Depth below sea level", "m", false));
        tables.add_level(200, LevelEntry::fixed("entire_atmosphere", "Entire atmosphere layer"));
        tables.add_level(204, LevelEntry::fixed("highest_tropospheric_freezing", "Highest tropospheric freezing level"));
        tables.add_level(211, LevelEntry::fixed("boundary_layer_cloud", "Boundary layer cloud layer"));
        tables.add_level(212, LevelEntry::fixed("low_cloud_bottom", "Low cloud bottom level"));
        tables.add_level(213, LevelEntry::fixed("low_cloud_top", "Low cloud top level"));
        tables.add_level(214, LevelEntry::fixed("low_cloud", "Low cloud layer"));
        tables.add_level(220, LevelEntry::fixed("planetary_boundary", "Planetary boundary layer"));
        tables.add_level(222, LevelEntry::fixed("middle_cloud_bottom", "Middle cloud bottom level"));
        tables.add_level(223, LevelEntry::fixed("middle_cloud_top", "Middle cloud top level"));
        tables.add_level(224, LevelEntry::fixed("middle_cloud", "Middle cloud layer"));
        tables.add_level(232, LevelEntry::fixed("high_cloud_bottom", "High cloud bottom level"));
        tables.add_level(233, LevelEntry::fixed("high_cloud_top", "High cloud top level"));
        tables.add_level(234, LevelEntry::fixed("high_cloud", "High cloud layer"));
        tables
    }

    /// Built-in GRIB-1 tables (NCEP parameter table 2 and level table 3 subsets).
    pub fn grib1() -> Self {
        let mut tables = Self::new();
        for &(number, name, description, unit) in GRIB1_PARAMETERS {
            tables.add_parameter(
                ParameterId::new(0, 2, number),
                GridParameter::new(name, description, unit),
            );
        }

        tables.add_level(1, LevelEntry::fixed("surface", "Ground or water surface"));
        tables.add_level(2, LevelEntry::fixed("cloud_base", "Cloud base level"));
        tables.add_level(3, LevelEntry::fixed("cloud_tops", "Cloud top level"));
        tables.add_level(4, LevelEntry::fixed("zeroDegC_isotherm", "Level of 0 deg C isotherm"));
        tables.add_level(6, LevelEntry::fixed("maximum_wind", "Maximum wind level"));
        tables.add_level(7, LevelEntry::fixed("tropopause", "Tropopause"));
        tables.add_level(8, LevelEntry::fixed("atmosphere_top", "Nominal top of atmosphere"));
        tables.add_level(100, LevelEntry::vertical("isobaric", "Isobaric level", "hPa", false));
        tables.add_level(101, LevelEntry::vertical("layer_between_two_isobaric", "Layer between two isobaric levels", "kPa", false));
        tables.add_level(102, LevelEntry::fixed("msl", "Mean sea level"));
        tables.add_level(103, LevelEntry::vertical("altitude_above_msl", "Altitude above mean sea level", "m", true));
        tables.add_level(104, LevelEntry::vertical("layer_between_two_altitudes_above_msl", "Layer between two altitudes above msl", "hm", true));
        tables.add_level(105, LevelEntry::vertical("height_above_ground", "Specified height level above ground", "m", true));
        tables.add_level(106, LevelEntry::vertical("layer_between_two_heights_above_ground", "Layer between two specified height levels above ground", "hm", true));
        tables.add_level(107, LevelEntry::vertical("sigma", "Sigma level", "", false));
        tables.add_level(108, LevelEntry::vertical("layer_between_two_sigmas", "Layer between two sigma levels", "", false));
        tables.add_level(109, LevelEntry::vertical("hybrid", "Hybrid level", "", false).as_hybrid());
        tables.add_level(110, LevelEntry::vertical("layer_between_two_hybrids", "Layer between two hybrid levels", "", false).as_hybrid());
        tables.add_level(111, LevelEntry::vertical("depth_below_surface", "Depth below land surface", "cm", false));
        tables.add_level(112, LevelEntry::vertical("layer_between_two_depths_below_surface", "Layer between two depths below land surface", "cm", false));
        tables.add_level(113, LevelEntry::vertical("isentrope", "Isentropic (theta) level", "K", true));
        tables.add_level(116, LevelEntry::vertical("layer_between_levels_at_specified_pressure_difference_from_ground", "Layer between two levels at specified pressure difference from ground to level", "hPa", false));
        tables.add_level(160, LevelEntry::vertical("depth_below_sea", "Depth below sea level", "m", false));
        tables.add_level(200, LevelEntry::fixed("entire_atmosphere", "Entire atmosphere (considered as a single layer)"));
        tables
    }
}

/// GRIB-2 parameters: ((discipline, category, number), name, description, unit).
const GRIB2_PARAMETERS: &[((u8, u8, u8), &str, &str, &str)] = &[
    // Temperature
    ((0, 0, 0), "TMP", "Temperature", "K"),
    ((0, 0, 1), "VTMP", "Virtual temperature", "K"),
    ((0, 0, 2), "POT", "Potential temperature", "K"),
    ((0, 0, 4), "TMAX", "Maximum temperature", "K"),
    ((0, 0, 5), "TMIN", "Minimum temperature", "K"),
    ((0, 0, 6), "DPT", "Dew point temperature", "K"),
    // Moisture
    ((0, 1, 0), "SPFH", "Specific humidity", "kg/kg"),
    ((0, 1, 1), "RH", "Relative humidity", "%"),
    ((0, 1, 3), "PWAT", "Precipitable water", "kg/m^2"),
    ((0, 1, 7), "PRATE", "Precipitation rate", "kg/m^2/s"),
    ((0, 1, 8), "APCP", "Total precipitation", "kg/m^2"),
    ((0, 1, 9), "NCPCP", "Large scale precipitation (non-convective)", "kg/m^2"),
    ((0, 1, 10), "ACPCP", "Convective precipitation", "kg/m^2"),
    ((0, 1, 13), "WEASD", "Water equivalent of accumulated snow depth", "kg/m^2"),
    // Momentum
    ((0, 2, 0), "WDIR", "Wind direction (from which blowing)", "degree true"),
    ((0, 2, 1), "WIND", "Wind speed", "m/s"),
    ((0, 2, 2), "UGRD", "u-component of wind", "m/s"),
    ((0, 2, 3), "VGRD", "v-component of wind", "m/s"),
    ((0, 2, 8), "VVEL", "Vertical velocity (pressure)", "Pa/s"),
    ((0, 2, 10), "ABSV", "Absolute vorticity", "1/s"),
    ((0, 2, 22), "GUST", "Wind speed (gust)", "m/s"),
    ((0, 2, 194), "USTM", "u-component storm motion", "m/s"),
    ((0, 2, 195), "VSTM", "v-component storm motion", "m/s"),
    // Mass
    ((0, 3, 0), "PRES", "Pressure", "Pa"),
    ((0, 3, 1), "PRMSL", "Pressure reduced to MSL", "Pa"),
    ((0, 3, 5), "HGT", "Geopotential height", "gpm"),
    // Cloud
    ((0, 6, 1), "TCDC", "Total cloud cover", "%"),
    ((0, 6, 3), "LCDC", "Low cloud cover", "%"),
    ((0, 6, 4), "MCDC", "Medium cloud cover", "%"),
    ((0, 6, 5), "HCDC", "High cloud cover", "%"),
    ((0, 6, 6), "CWAT", "Cloud water", "kg/m^2"),
    // Stability
    ((0, 7, 6), "CAPE", "Convective available potential energy", "J/kg"),
    ((0, 7, 7), "CIN", "Convective inhibition", "J/kg"),
    ((0, 7, 8), "HLCY", "Storm relative helicity", "m^2/s^2"),
    ((0, 7, 192), "LFTX", "Surface lifted index", "K"),
    ((0, 7, 193), "4LFTX", "Best (4 layer) lifted index", "K"),
    // Radar
    ((0, 16, 195), "REFD", "Reflectivity", "dB"),
    ((0, 16, 196), "REFC", "Composite reflectivity", "dB"),
    ((0, 16, 197), "RETOP", "Echo top", "m"),
    // Physical atmospheric properties
    ((0, 19, 0), "VIS", "Visibility", "m"),
    ((0, 19, 11), "TKE", "Turbulent kinetic energy", "J/kg"),
    // Land surface
    ((2, 0, 0), "LAND", "Land cover (1=land, 0=sea)", "Proportion"),
    ((2, 0, 192), "SOILW", "Volumetric soil moisture content", "Fraction"),
    // Oceanographic
    ((10, 0, 3), "HTSGW", "Significant height of combined wind waves and swell", "m"),
    ((10, 3, 0), "WTMP", "Water temperature", "K"),
];

/// GRIB-1 parameters (table version 2): (number, name, description, unit).
const GRIB1_PARAMETERS: &[(u8, &str, &str, &str)] = &[
    (1, "PRES", "Pressure", "Pa"),
    (2, "PRMSL", "Pressure reduced to MSL", "Pa"),
    (7, "HGT", "Geopotential height", "gpm"),
    (11, "TMP", "Temperature", "K"),
    (15, "TMAX", "Maximum temperature", "K"),
    (16, "TMIN", "Minimum temperature", "K"),
    (17, "DPT", "Dew point temperature", "K"),
    (33, "UGRD", "u-component of wind", "m/s"),
    (34, "VGRD", "v-component of wind", "m/s"),
    (39, "VVEL", "Pressure vertical velocity", "Pa/s"),
    (51, "SPFH", "Specific humidity", "kg/kg"),
    (52, "RH", "Relative humidity", "%"),
    (61, "APCP", "Total precipitation", "kg/m^2"),
    (71, "TCDC", "Total cloud cover", "%"),
];
