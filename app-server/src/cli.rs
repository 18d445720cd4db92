//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ServerConfig};

#[derive(Debug, Default, Parser)]
#[command(name = "toolsmith")]
#[command(version, about = "Execute tools over HTTP, synthesizing missing ones with an LLM")]
pub struct Args {
    /// TOML configuration file
    #[arg(long, short = 'c', env = "TOOLSMITH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on (default: 127.0.0.1:3000)
    #[arg(long, env = "TOOLSMITH_BIND")]
    pub bind: Option<String>,

    /// Directory holding tool sources (default: ./tools)
    #[arg(long, env = "TOOLSMITH_TOOLS_DIR")]
    pub tools_dir: Option<PathBuf>,
}

impl Args {
    /// Resolve the effective configuration: flags > config file > defaults.
    pub fn resolve_config(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config = config.with_bind_addr(bind);
        }
        if let Some(tools_dir) = &self.tools_dir {
            config.tools_dir = tools_dir.clone();
        }

        Ok(config)
    }
}
