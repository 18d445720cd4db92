//! Per-request tool registry.
//!
//! A `ToolRegistry` is a snapshot produced by
//! [`ToolLoader::discover_all`](crate::loader::ToolLoader::discover_all).
//! It is owned by the request that built it and never shared.

use std::collections::BTreeMap;

use crate::tool::{ToolDescriptor, ToolRecord};

/// Name-keyed set of loaded tools.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolRecord>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolRecord> {
        self.tools.get(name)
    }

    /// Whether a tool is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Register `record` under `name`, replacing any previous record.
    pub fn insert(&mut self, name: impl Into<String>, record: ToolRecord) {
        self.tools.insert(name.into(), record);
    }

    /// Remove and return the record for `name`.
    pub fn take(&mut self, name: &str) -> Option<ToolRecord> {
        self.tools.remove(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Descriptors of all tools, sorted by registry name.
    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().map(|record| &record.descriptor).collect()
    }

    /// Function-calling definitions of all tools, for model function selection.
    pub fn function_tools(&self) -> Vec<serde_json::Value> {
        self.descriptors()
            .into_iter()
            .map(ToolDescriptor::to_function_tool)
            .collect()
    }
}
