use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use toolsmith_app_server::{Args, ToolHandler, serve};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let config = args.resolve_config()?;

    let api_key = config.llm.api_key();
    if api_key.is_none() {
        warn!(
            "{} is not set; tool synthesis and function calls will fail",
            config.llm.api_key_env
        );
    }
    let provider = Arc::new(config.llm.provider(api_key));

    let handler = ToolHandler::from_config(&config, provider)
        .await
        .with_context(|| {
            format!(
                "failed to prepare tools directory {}",
                config.tools_dir.display()
            )
        })?;

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    serve(listener, Arc::new(handler)).await?;
    Ok(())
}
