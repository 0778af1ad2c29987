//! Table lookup built from model configuration files.
//!
//! Model YAML files extend the built-in parameter and level tables:
//!
//! ```yaml
//! model:
//!   id: hrrr
//!   center: US National Weather Service - NCEP
//!   process: High Resolution Rapid Refresh
//!   missing_value: -9999.0
//! parameters:
//!   - name: TMP
//!     description: Temperature
//!     units: K
//!     grib2: { discipline: 0, category: 0, number: 0 }
//!     levels:
//!       - level_code: 103
//!         display: "{value} m above ground"
//! ```

use crate::error::{Result, SynthesisError};
use grid_record::{GridFormat, GridParameter, GridTables, ParameterId, Provenance, TableLookup};
use serde_yaml::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Get the models config directory path.
///
/// Checks CONFIG_DIR environment variable first, falls back to "config/models".
pub fn get_models_dir() -> PathBuf {
    if let Ok(config_dir) = env::var("CONFIG_DIR") {
        PathBuf::from(config_dir).join("models")
    } else {
        PathBuf::from("config/models")
    }
}

/// Model-level settings read alongside the tables.
#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    pub id: Option<String>,
    pub provenance: Provenance,
    pub missing_value: Option<f32>,
    pub tables: GridTables,
}

/// Parse a model config file, resolving defaults against `base`.
pub fn load_model_config(path: &Path, base: &GridTables) -> Result<ModelConfig> {
    let contents = fs::read_to_string(path)?;
    let yaml: Value = serde_yaml::from_str(&contents)?;
    let mut config = ModelConfig::default();

    if let Some(model) = yaml.get("model") {
        let text = |key: &str| model.get(key).and_then(Value::as_str).map(str::to_string);
        config.id = text("id");
        config.provenance = Provenance {
            center: text("center"),
            process: text("process").or_else(|| text("name")),
            product_status: text("product_status"),
            product_type: text("product_type"),
        };
        config.missing_value = model.get("missing_value").and_then(Value::as_f64).map(|v| v as f32);
    }

    let parameters = yaml
        .get("parameters")
        .and_then(Value::as_sequence)
        .ok_or_else(|| {
            SynthesisError::InvalidConfig(format!("missing 'parameters' section in {:?}", path))
        })?;

    for param in parameters {
        let name = match param.get("name").and_then(Value::as_str) {
            Some(n) => n.to_string(),
            None => continue,
        };

        if let Some(id) = param_id(param) {
            let known = base.has_parameter(id).then(|| base.parameter(id));
            let description = param
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| known.as_ref().map(|p| p.description.clone()))
                .unwrap_or_else(|| name.clone());
            let unit = param
                .get("units")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| known.as_ref().map(|p| p.unit.clone()))
                .unwrap_or_default();
            config
                .tables
                .add_parameter(id, GridParameter::new(name.clone(), description, unit));
        }

        let Some(levels) = param.get("levels").and_then(Value::as_sequence) else {
            continue;
        };
        for level in levels {
            let Some(code) = level.get("level_code").and_then(Value::as_i64) else {
                continue;
            };
            let code = code as i32;
            // First definition of a level type wins
            if config.tables.has_level(code) {
                continue;
            }
            let mut entry = base.level(code);
            let display = level
                .get("display")
                .and_then(Value::as_str)
                .or_else(|| level.get("display_template").and_then(Value::as_str));
            if let Some(display) = display {
                let description = display.replace("{value}", "");
                if !description.trim().is_empty() {
                    entry.description = description.trim().to_string();
                }
            }
            if let Some(level_name) = level.get("name").and_then(Value::as_str) {
                entry.name = level_name.to_string();
            }
            if let Some(units) = level.get("units").and_then(Value::as_str) {
                entry.units = units.to_string();
            }
            if let Some(vertical) = level.get("vertical").and_then(Value::as_bool) {
                entry.vertical = vertical;
            }
            if let Some(positive) = level.get("positive").and_then(Value::as_str) {
                entry.positive_up = positive.eq_ignore_ascii_case("up");
            }
            config.tables.add_level(code, entry);
        }
    }

    Ok(config)
}

fn param_id(param: &Value) -> Option<ParameterId> {
    let code = |section: &Value, key: &str, default: u64| {
        section.get(key).and_then(Value::as_u64).unwrap_or(default) as u8
    };
    if let Some(grib2) = param.get("grib2") {
        return Some(ParameterId::new(
            code(grib2, "discipline", 0),
            code(grib2, "category", 0),
            code(grib2, "number", 0),
        ));
    }
    // GRIB-1 parameters live in category 2 of discipline 0
    param
        .get("grib1")
        .map(|grib1| ParameterId::new(0, 2, code(grib1, "number", 0)))
}

/// Build a lookup for `format` with the model's tables merged over the built-ins.
///
/// # Errors
///
/// Returns an error if the model config does not exist or cannot be parsed.
pub fn build_lookup_for_model(model: &str, format: GridFormat) -> Result<TableLookup> {
    let config_path = get_models_dir().join(format!("{}.yaml", model));

    if !config_path.exists() {
        error!(
            model = %model,
            path = ?config_path,
            "Model configuration file not found"
        );
        return Err(SynthesisError::InvalidConfig(format!(
            "model config not found: {}, expected at {:?}",
            model, config_path
        )));
    }

    build_lookup_from_path(&config_path, format)
}

/// Build a lookup from an explicit config file path.
pub fn build_lookup_from_path(path: &Path, format: GridFormat) -> Result<TableLookup> {
    let mut lookup = TableLookup::for_format(format);
    let config = load_model_config(path, lookup.tables()).map_err(|e| {
        error!(path = ?path, error = %e, "Failed to load model configuration");
        e
    })?;

    debug!(
        model = config.id.as_deref().unwrap_or("unknown"),
        parameters = config.tables.parameter_count(),
        levels = config.tables.level_count(),
        "Loaded model tables"
    );

    lookup.tables_mut().merge(config.tables);
    lookup = lookup.with_provenance(config.provenance);
    if let Some(missing) = config.missing_value {
        lookup = lookup.with_missing_value(missing);
    }
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_record::GridTableLookup;
    use std::io::Write;
    use tempfile::tempdir;

    fn create_test_config(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(format!("{}.yaml", name));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const CONFIG: &str = r#"
model:
  id: test
  name: "Test Model"
  center: "Test Centre"
  missing_value: -999.0

parameters:
  - name: TMP
    grib2:
      discipline: 0
      category: 0
      number: 0
    levels:
      - level_code: 1
        display: "surface"
      - level_code: 103
        display: "{value} m above ground"
  - name: REFC
    description: Composite reflectivity
    units: dB
    grib2:
      discipline: 0
      category: 16
      number: 196
    levels:
      - level_code: 200
        display: "entire atmosphere"
      - level_code: 241
        name: ocean_layer
        display: "Ocean layer"
        units: m
        vertical: true
        positive: down
"#;

    #[test]
    fn test_load_model_config() {
        let dir = tempdir().unwrap();
        let path = create_test_config(dir.path(), "test", CONFIG);
        let base = GridTables::grib2();
        let config = load_model_config(&path, &base).unwrap();

        assert_eq!(config.id.as_deref(), Some("test"));
        assert_eq!(config.provenance.center.as_deref(), Some("Test Centre"));
        assert_eq!(config.provenance.process.as_deref(), Some("Test Model"));
        assert_eq!(config.missing_value, Some(-999.0));

        let tmp = config.tables.parameter(ParameterId::new(0, 0, 0));
        assert_eq!(tmp.description, "Temperature");
        assert_eq!(tmp.unit, "K");
        let refc = config.tables.parameter(ParameterId::new(0, 16, 196));
        assert_eq!(refc.description, "Composite reflectivity");

        assert_eq!(config.tables.level(103).description, "m above ground");
        assert_eq!(config.tables.level(103).name, "height_above_ground");
        let ocean = config.tables.level(241);
        assert!(ocean.vertical);
        assert!(!ocean.positive_up);
        assert_eq!(ocean.name, "ocean_layer");
    }

    #[test]
    fn test_missing_parameters_section() {
        let dir = tempdir().unwrap();
        let path = create_test_config(dir.path(), "empty", "model:\n  id: empty\n");
        assert!(matches!(
            load_model_config(&path, &GridTables::new()),
            Err(SynthesisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = tempdir().unwrap();
        let path = create_test_config(dir.path(), "bad", "parameters: [\n");
        assert!(matches!(
            load_model_config(&path, &GridTables::new()),
            Err(SynthesisError::Yaml(_))
        ));
    }

    #[test]
    fn test_build_lookup_from_path() {
        let dir = tempdir().unwrap();
        let path = create_test_config(dir.path(), "test", CONFIG);
        let lookup = build_lookup_from_path(&path, GridFormat::Grib2).unwrap();
        assert_eq!(lookup.missing_value(), -999.0);
        assert_eq!(lookup.provenance().center.as_deref(), Some("Test Centre"));
        assert!(lookup.tables().has_parameter(ParameterId::new(0, 16, 196)));
        // Built-ins survive the merge
        assert!(lookup.tables().has_level(100));
    }

    #[test]
    fn test_missing_model() {
        assert!(build_lookup_for_model("no-such-model-config", GridFormat::Grib2).is_err());
    }
}
