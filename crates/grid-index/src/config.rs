//! Configuration for a synthesis pass.

use serde::{Deserialize, Serialize};

/// Options passed to the [`Synthesizer`](crate::Synthesizer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Name variables after the parameter description rather than its short name.
    pub use_description_for_variable_name: bool,

    /// Absolute tolerance for level equality, relative for magnitudes above one.
    pub level_tolerance: f64,

    /// Emit 2-D lat/lon fields for every projected grid, not only space views.
    pub add_lat_lon_2d: bool,

    /// Copy grid definition parameters onto the grid mapping variable.
    pub emit_grid_definition_params: bool,

    /// Replace declared MSG spacing with the calibrated constants.
    pub apply_msg_correction: bool,

    /// Value of the `Conventions` global attribute.
    pub conventions: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            use_description_for_variable_name: true,
            level_tolerance: 1e-5,
            add_lat_lon_2d: false,
            emit_grid_definition_params: true,
            apply_msg_correction: true,
            conventions: "CF-1.0".to_string(),
        }
    }
}

fn parse_bool(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

impl SynthesisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRID_USE_DESCRIPTION_NAMES") {
            config.use_description_for_variable_name = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("GRID_LEVEL_TOLERANCE") {
            if let Ok(tolerance) = val.parse() {
                config.level_tolerance = tolerance;
            }
        }

        if let Ok(val) = std::env::var("GRID_ADD_LATLON_2D") {
            config.add_lat_lon_2d = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("GRID_EMIT_GDS_PARAMS") {
            config.emit_grid_definition_params = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("GRID_MSG_CORRECTION") {
            config.apply_msg_correction = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("GRID_CONVENTIONS") {
            if !val.trim().is_empty() {
                config.conventions = val;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.level_tolerance.is_finite() || self.level_tolerance <= 0.0 {
            return Err("level_tolerance must be finite and > 0".to_string());
        }

        if self.conventions.trim().is_empty() {
            return Err("conventions must not be empty".to_string());
        }

        Ok(())
    }
}
