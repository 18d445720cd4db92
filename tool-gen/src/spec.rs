//! Parameter schema types.
//!
//! A tool advertises its parameters as a JSON-Schema-shaped object, the same
//! shape function-calling models consume.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn object_type() -> String {
    "object".to_string()
}

/// Schema of a tool's parameter mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Always `"object"` for well-formed tools.
    #[serde(rename = "type", default = "object_type")]
    pub kind: String,

    /// Declared parameters by name.
    #[serde(default)]
    pub properties: BTreeMap<String, ParameterProperty>,

    /// Names of required parameters.
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self {
            kind: object_type(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }
}

impl ParameterSchema {
    /// Create an empty object schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter.
    pub fn with_required(
        mut self,
        name: impl Into<String>,
        data_type: DataType,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties
            .insert(name, ParameterProperty::new(data_type, description));
        self
    }

    /// Add an optional parameter.
    pub fn with_optional(
        mut self,
        name: impl Into<String>,
        data_type: DataType,
        description: impl Into<String>,
    ) -> Self {
        self.properties
            .insert(name.into(), ParameterProperty::new(data_type, description));
        self
    }

    /// Check the structural invariants of the schema.
    pub fn validate(&self) -> Result<(), String> {
        if self.kind != "object" {
            return Err(format!(
                "parameters must have type \"object\", got \"{}\"",
                self.kind
            ));
        }

        if let Some(missing) = self
            .required
            .iter()
            .find(|name| !self.properties.contains_key(*name))
        {
            return Err(format!(
                "required parameter `{missing}` is not declared in properties"
            ));
        }

        Ok(())
    }

    /// Convert to JSON Schema.
    pub fn to_schema(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
    }
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterProperty {
    /// Declared type.
    #[serde(rename = "type")]
    pub data_type: DataType,

    /// Description shown to the model.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Any further JSON Schema keywords (`enum`, `items`, ...), passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ParameterProperty {
    /// Create a property with no extra keywords.
    pub fn new(data_type: DataType, description: impl Into<String>) -> Self {
        Self {
            data_type,
            description: description.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Data types for tool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}
