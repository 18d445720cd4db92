//! Core tool types.
//!
//! A tool is a named operation with a [`ToolDescriptor`] advertised to models
//! and a [`ToolImplementation`] that runs it.

use serde::{Deserialize, Serialize};

use crate::runtime::ToolImplementation;
use crate::spec::ParameterSchema;

/// File extension of persisted tool sources.
pub const TOOL_EXTENSION: &str = "rhai";

/// Whether `name` can be used as a tool name (and therefore a file stem).
pub fn is_valid_tool_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Metadata describing a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name (used in function calls).
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Schema of the parameter mapping.
    #[serde(default)]
    pub parameters: ParameterSchema,
}

impl ToolDescriptor {
    /// Create a descriptor with an empty parameter schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ParameterSchema::default(),
        }
    }

    /// Set the parameter schema.
    pub fn with_parameters(mut self, parameters: ParameterSchema) -> Self {
        self.parameters = parameters;
        self
    }

    /// The function-calling tool definition offered to a model.
    pub fn to_function_tool(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters.to_schema(),
            }
        })
    }
}

fn function_kind() -> String {
    "function".to_string()
}

/// The `details` value a tool source defines.
///
/// Mirrors the function-calling tool shape:
/// `{type: "function", function: {name, description, parameters}}`.
/// A top-level `description` is accepted when the function has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDetails {
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,

    pub function: ToolDescriptor,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ToolDetails {
    /// Resolve into a descriptor.
    pub fn into_descriptor(self) -> Result<ToolDescriptor, String> {
        if self.kind != "function" {
            return Err(format!("details type must be \"function\", got \"{}\"", self.kind));
        }

        let mut descriptor = self.function;
        if descriptor.description.is_empty() {
            if let Some(description) = self.description {
                descriptor.description = description;
            }
        }
        descriptor.parameters.validate()?;
        Ok(descriptor)
    }
}

/// A loaded tool: descriptor plus callable implementation.
#[derive(Debug, Clone)]
pub struct ToolRecord {
    pub descriptor: ToolDescriptor,
    pub implementation: ToolImplementation,
}
