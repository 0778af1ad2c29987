//! The container sink and its in-memory implementation.
//!
//! Synthesis emits dimensions, coordinate variables, the grid mapping and
//! data variables into a [`DatasetSink`]. [`SchemaBuilder`] collects them
//! into a serializable [`DatasetSchema`].

use grid_common::{Attribute, AttributeValue};
use serde::Serialize;

/// A named dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub name: String,
    pub length: usize,
}

impl Dimension {
    pub fn new(name: impl Into<String>, length: usize) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

/// Element type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float,
    Double,
    Int,
    Char,
}

/// Opaque reference from a data variable to its record tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VariableHandle {
    /// Horizontal group index.
    pub group: usize,
    /// Variable index within the group.
    pub variable: usize,
}

/// One variable as handed to the sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSchema {
    pub name: String,
    pub dimensions: Vec<String>,
    pub data_type: DataType,
    pub attributes: Vec<Attribute>,
    /// Inline values for coordinate variables, row-major.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    /// Present on data variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<VariableHandle>,
}

impl VariableSchema {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            dimensions: Vec::new(),
            data_type,
            attributes: Vec::new(),
            values: None,
            handle: None,
        }
    }

    pub fn with_dimensions<S: Into<String>>(mut self, dims: impl IntoIterator<Item = S>) -> Self {
        self.dimensions = dims.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_attributes(mut self, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        self.attributes.extend(attrs);
        self
    }

    pub fn with_values(mut self, values: Vec<f64>) -> Self {
        self.values = Some(values);
        self
    }

    pub fn with_handle(mut self, handle: VariableHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        Attribute::find(&self.attributes, name)
    }
}

/// Receiver of the synthesized structure.
///
/// `group` is `None` for the root group. Groups are announced with
/// [`add_group`](DatasetSink::add_group) before anything is added to them.
pub trait DatasetSink {
    fn add_global_attribute(&mut self, attribute: Attribute);
    fn add_group(&mut self, name: &str);
    fn add_dimension(&mut self, group: Option<&str>, dimension: Dimension);
    fn add_variable(&mut self, group: Option<&str>, variable: VariableSchema);
}

/// Dimensions and variables of one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupSchema {
    pub name: String,
    pub dimensions: Vec<Dimension>,
    pub variables: Vec<VariableSchema>,
}

impl GroupSchema {
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn variable(&self, name: &str) -> Option<&VariableSchema> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Data variables, in emission order.
    pub fn data_variables(&self) -> impl Iterator<Item = &VariableSchema> {
        self.variables.iter().filter(|v| v.handle.is_some())
    }
}

/// The complete emitted structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSchema {
    pub attributes: Vec<Attribute>,
    pub root: GroupSchema,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupSchema>,
}

impl DatasetSchema {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        Attribute::find(&self.attributes, name)
    }

    /// A group by name; `None` selects the root.
    pub fn group(&self, name: Option<&str>) -> Option<&GroupSchema> {
        match name {
            None => Some(&self.root),
            Some(name) => self.groups.iter().find(|g| g.name == name),
        }
    }

    /// All groups holding data: the named groups when present, else the root.
    pub fn data_groups(&self) -> Vec<&GroupSchema> {
        if self.groups.is_empty() {
            vec![&self.root]
        } else {
            self.groups.iter().collect()
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// In-memory sink producing a [`DatasetSchema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: DatasetSchema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> DatasetSchema {
        self.schema
    }

    fn group_mut(&mut self, group: Option<&str>) -> &mut GroupSchema {
        let Some(name) = group else {
            return &mut self.schema.root;
        };
        let position = match self.schema.groups.iter().position(|g| g.name == name) {
            Some(i) => i,
            None => {
                self.add_group(name);
                self.schema.groups.len() - 1
            }
        };
        &mut self.schema.groups[position]
    }
}

impl DatasetSink for SchemaBuilder {
    fn add_global_attribute(&mut self, attribute: Attribute) {
        self.schema.attributes.push(attribute);
    }

    fn add_group(&mut self, name: &str) {
        if !self.schema.groups.iter().any(|g| g.name == name) {
            self.schema.groups.push(GroupSchema {
                name: name.to_string(),
                ..Default::default()
            });
        }
    }

    fn add_dimension(&mut self, group: Option<&str>, dimension: Dimension) {
        self.group_mut(group).dimensions.push(dimension);
    }

    fn add_variable(&mut self, group: Option<&str>, variable: VariableSchema) {
        self.group_mut(group).variables.push(variable);
    }
}
