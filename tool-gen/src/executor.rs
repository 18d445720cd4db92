//! Tool request dispatch.
//!
//! The `ToolExecutor` resolves a tool by name against a fresh discovery,
//! synthesizes it when missing, and runs it with the caller's parameters.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, ToolError};
use crate::generator::ToolSynthesizer;
use crate::loader::ToolLoader;
use crate::registry::ToolRegistry;
use crate::tool::{ToolDescriptor, ToolRecord, is_valid_tool_name};

/// Result of a successful dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Value returned by the tool.
    pub output: serde_json::Value,

    /// Whether the tool was synthesized for this request.
    pub synthesized: bool,

    /// Execution time in milliseconds, excluding synthesis.
    pub duration_ms: u64,
}

/// Dispatcher for tool requests.
///
/// Parameters are handed to the tool unchecked: each tool validates its own
/// inputs.
pub struct ToolExecutor {
    loader: Arc<ToolLoader>,
    synthesizer: ToolSynthesizer,
}

impl ToolExecutor {
    /// Create a new executor.
    pub fn new(loader: Arc<ToolLoader>, synthesizer: ToolSynthesizer) -> Self {
        Self {
            loader,
            synthesizer,
        }
    }

    /// Discover the currently persisted tools.
    pub async fn discover(&self) -> Result<ToolRegistry> {
        Ok(self.loader.discover_all().await?)
    }

    /// Descriptors of the currently persisted tools, sorted by name.
    pub async fn descriptors(&self) -> Result<Vec<ToolDescriptor>> {
        let registry = self.discover().await?;
        Ok(registry.descriptors().into_iter().cloned().collect())
    }

    /// Find `name` in a fresh discovery, synthesizing it when absent.
    ///
    /// Returns the record and whether it was synthesized.
    pub async fn resolve(&self, name: &str) -> Result<(ToolRecord, bool)> {
        if !is_valid_tool_name(name) {
            return Err(ToolError::InvalidName(name.to_string()));
        }

        let mut registry = self.discover().await?;
        if let Some(record) = registry.take(name) {
            return Ok((record, false));
        }

        warn!("Tool {name} not found. Generating it now...");
        let record = self.synthesizer.synthesize(name).await?;
        Ok((record, true))
    }

    /// Execute the tool `name` with `parameters`.
    pub async fn execute(
        &self,
        name: &str,
        parameters: serde_json::Map<String, serde_json::Value>,
    ) -> Result<ExecutionResult> {
        let (record, synthesized) = self.resolve(name).await?;
        debug!("Executing tool: {name} with inputs: {parameters:?}");

        let start = Instant::now();
        let implementation = record.implementation;
        let output = tokio::task::spawn_blocking(move || implementation.call(&parameters))
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("tool task failed: {e}")))?;
        let duration_ms = start.elapsed().as_millis() as u64;

        match output {
            Ok(output) => {
                info!("Tool {name} executed successfully in {duration_ms}ms");
                Ok(ExecutionResult {
                    output,
                    synthesized,
                    duration_ms,
                })
            }
            Err(e) => {
                warn!("Tool {name} failed: {e}");
                Err(e)
            }
        }
    }
}
