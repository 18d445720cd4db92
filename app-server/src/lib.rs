//! # toolsmith app-server
//!
//! HTTP front end over [`toolsmith_tool_gen`]. Routes:
//!
//! - `POST /execute-function`: run a tool by name, synthesizing it if missing
//! - `POST /openai-function-call`: let the model choose a tool for a prompt
//! - `GET /tools`: list installed tools
//! - `GET /health`: liveness

pub mod cli;
pub mod config;
pub mod error;
pub mod router;
pub mod tool_handler;

pub use cli::Args;
pub use config::{ConfigError, LlmConfig, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use router::{create_router, serve};
pub use tool_handler::{
    ExecuteFunctionParams, FunctionCallParams, FunctionCallResponse, ListToolsResponse,
    ToolHandler,
};
