//! Configuration for the toolsmith server.
//!
//! Values resolve in order: built-in defaults, an optional TOML file, then
//! command-line flags (see [`crate::cli::Args`]).

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toolsmith_completions::OpenAIProvider;
use toolsmith_tool_gen::RuntimeLimits;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`ServerConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: String,

    /// Directory holding persisted tool sources.
    pub tools_dir: PathBuf,

    /// LLM completion service settings.
    pub llm: LlmConfig,

    /// Capability limits for tool scripts.
    pub limits: RuntimeLimits,
}

impl ServerConfig {
    /// Create a configuration storing tools under `tools_dir`.
    pub fn new(tools_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            tools_dir: tools_dir.into(),
            llm: LlmConfig::default(),
            limits: RuntimeLimits::default(),
        }
    }

    /// Load a configuration file. Keys it omits keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Set the bind address.
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Set the LLM configuration.
    pub fn with_llm(mut self, config: LlmConfig) -> Self {
        self.llm = config;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("tools")
    }
}

/// Settings for the OpenAI-compatible completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL, without the `/chat/completions` suffix.
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Model used to write missing tools.
    pub synthesis_model: String,

    /// Model used to pick a tool for a natural-language prompt.
    pub function_call_model: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl LlmConfig {
    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The API key, read from [`LlmConfig::api_key_env`].
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }

    /// Build a provider for these settings authenticating with `api_key`.
    ///
    /// Without a key the provider stays unconfigured, whatever else is set in
    /// the environment.
    pub fn provider(&self, api_key: Option<String>) -> OpenAIProvider {
        OpenAIProvider::new()
            .with_optional_api_key(api_key)
            .with_base_url(&self.base_url)
            .with_model(&self.synthesis_model)
            .with_timeout(self.request_timeout())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            synthesis_model: "gpt-4o".to_string(),
            function_call_model: "gpt-3.5-turbo".to_string(),
            request_timeout_secs: 120,
        }
    }
}
