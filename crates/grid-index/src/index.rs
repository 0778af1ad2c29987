//! The input collection: grid definitions plus the records that use them.

use grid_common::GridDefinition;
use grid_record::GridRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parsed records of one dataset and the grid definitions they reference.
///
/// Record order carries no meaning; synthesis output is the same for any
/// permutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridIndex {
    #[serde(default)]
    pub definitions: Vec<GridDefinition>,
    #[serde(default)]
    pub records: Vec<GridRecord>,
}

impl GridIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(mut self, definition: GridDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = GridRecord>) -> Self {
        self.records.extend(records);
        self
    }

    pub fn add_definition(&mut self, definition: GridDefinition) {
        self.definitions.push(definition);
    }

    pub fn add_record(&mut self, record: GridRecord) {
        self.records.push(record);
    }

    /// Definitions by key. The first definition wins when keys repeat.
    pub fn definitions_by_key(&self) -> HashMap<&str, &GridDefinition> {
        let mut map = HashMap::with_capacity(self.definitions.len());
        for definition in &self.definitions {
            map.entry(definition.key()).or_insert(definition);
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
