//! # Tool Generation
//!
//! This crate implements the tool registry and on-demand synthesis pipeline
//! behind the toolsmith server. It can:
//!
//! - **Store Tools**: persist tool sources, one file per tool name
//! - **Load Tools**: evaluate sources in a capability-limited Rhai runtime
//! - **Discover Tools**: rebuild the registry from disk on every request
//! - **Synthesize Tools**: ask an LLM for a missing tool and install it live
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Tool Generation System                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ToolExecutor ──► ToolLoader ──► ToolStore (<name>.rhai)        │
//! │       │               │                                         │
//! │       ▼               ▼                                         │
//! │  ToolSynthesizer  ToolRuntime ──► ToolRecord ──► ToolRegistry   │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  CompletionProvider                                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod executor;
pub mod generator;
pub mod loader;
pub mod registry;
pub mod runtime;
pub mod spec;
pub mod storage;
pub mod tool;

#[cfg(test)]
mod test_support;

pub use error::{LoadError, Result, StorageError, SynthesisError, ToolError};
pub use executor::{ExecutionResult, ToolExecutor};
pub use generator::{ToolSynthesizer, build_prompt, example_tool_source, extract_code_block};
pub use loader::ToolLoader;
pub use registry::ToolRegistry;
pub use runtime::{RuntimeLimits, ToolImplementation, ToolRuntime};
pub use spec::{DataType, ParameterProperty, ParameterSchema};
pub use storage::ToolStore;
pub use tool::{ToolDescriptor, ToolDetails, ToolRecord, is_valid_tool_name};
