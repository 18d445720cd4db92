//! Error types for the tool pipeline.

use thiserror::Error;
use toolsmith_completions::CompletionError;

/// Result type alias for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors surfaced by the request dispatcher.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Tool name is not a filesystem-safe identifier.
    #[error("invalid tool name `{0}`: only ASCII letters, digits, `-` and `_` are allowed")]
    InvalidName(String),

    /// The tool itself rejected its parameters (`throw` in the script).
    #[error("{0}")]
    Rejected(String),

    /// The interpreter failed while running the tool.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The tool was missing and could not be synthesized.
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Name cannot be mapped to a file.
    #[error("invalid tool name: {0}")]
    InvalidName(String),

    /// No source persisted under this name.
    #[error("tool source not found: {0}")]
    NotFound(String),

    /// Failed to create storage directory.
    #[error("failed to create directory: {0}")]
    CreateDirectory(String),

    /// Failed to list the storage directory.
    #[error("failed to list directory: {0}")]
    ListDirectory(String),

    /// Failed to read tool file.
    #[error("failed to read file: {0}")]
    ReadFile(String),

    /// Failed to write tool file.
    #[error("failed to write file: {0}")]
    WriteFile(String),
}

/// Errors turning persisted source into a tool record.
#[derive(Error, Debug)]
pub enum LoadError {
    /// No persisted source exists.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Source could not be read.
    #[error("failed to read tool source: {0}")]
    Storage(#[from] StorageError),

    /// Source does not parse or its top level fails to evaluate.
    #[error("failed to evaluate `{name}`: {message}")]
    Evaluate { name: String, message: String },

    /// Source defines no `details` value.
    #[error("`{0}` does not define `details`")]
    MissingDetails(String),

    /// `details` does not describe a tool.
    #[error("`{name}` has malformed details: {message}")]
    InvalidDetails { name: String, message: String },

    /// Source defines no single-argument `execute` function.
    #[error("`{0}` does not define `fn execute(params)`")]
    MissingExecute(String),
}

/// Errors from the synthesis pipeline, one variant per stage.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The completion call itself failed (network, auth, rate limit).
    #[error("generation call failed: {0}")]
    Generation(#[from] CompletionError),

    /// The completion had no usable fenced code block.
    #[error("LLM did not return a valid code block")]
    Extraction,

    /// Extracted source could not be written.
    #[error("failed to persist generated tool: {0}")]
    Persistence(#[source] StorageError),

    /// Persisted source did not load.
    #[error("generated tool failed to load: {0}")]
    Reload(#[source] LoadError),

    /// Nothing loadable was found after persisting.
    #[error("generated tool `{0}` was not found after persisting")]
    NotFound(String),
}

impl SynthesisError {
    /// Name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Generation(_) => "generation",
            Self::Extraction => "extraction",
            Self::Persistence(_) => "persistence",
            Self::Reload(_) => "reload",
            Self::NotFound(_) => "not_found",
        }
    }
}
