//! # Completions
//!
//! Chat-completion client for the toolsmith service.
//!
//! The synthesizer uses it to ask a model for new tool source code, and the
//! function-call endpoint uses it to let a model pick one of the installed
//! tools for a natural-language prompt.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  CompletionRequest ──► CompletionProvider ──► CompletionResponse │
//! │                               │                    │             │
//! │                               ▼                    ▼             │
//! │                        OpenAIProvider         FunctionCall       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod provider;

pub use error::{CompletionError, Result};
pub use provider::{
    ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, FunctionCall,
    OpenAIProvider, Role,
};
