//! Loading record manifests.
//!
//! A manifest is a serialized [`GridIndex`] in JSON or YAML. Grid definition
//! parameters may be written as numbers or booleans; they are stored as text.

use anyhow::{Context, Result};
use grid_index::GridIndex;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a manifest, choosing the parser by file extension (`.json` or YAML).
pub fn load_manifest(path: &Path) -> Result<GridIndex> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let mut value: Value = if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?
    } else {
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?
    };

    stringify_params(&mut value);
    let index: GridIndex = serde_yaml::from_value(value)
        .with_context(|| format!("Manifest {} does not describe a grid index", path.display()))?;

    debug!(
        path = %path.display(),
        definitions = index.definitions.len(),
        records = index.records.len(),
        "Loaded manifest"
    );
    Ok(index)
}

/// Turn scalar definition parameters into strings.
fn stringify_params(value: &mut Value) {
    let Some(definitions) = value.get_mut("definitions").and_then(Value::as_sequence_mut) else {
        return;
    };
    for definition in definitions {
        let Some(params) = definition.get_mut("params").and_then(Value::as_mapping_mut) else {
            continue;
        };
        for (_, param) in params.iter_mut() {
            let text = match param {
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            *param = Value::String(text);
        }
    }
}
