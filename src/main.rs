//! API gateway.
//!
//! A single public entry point in front of a fixed set of backend services,
//! built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                   API GATEWAY                    │
//!                         │                                                  │
//!     Client Request      │  ┌──────────┐   ┌──────────┐   ┌─────────────┐   │
//!     ────────────────────┼─▶│ request  │──▶│   CORS   │──▶│  /health /  │   │
//!                         │  │ id+trace │   │  policy  │   │  routing    │   │
//!                         │  └──────────┘   └──────────┘   └──────┬──────┘   │
//!                         │                                       │          │
//!                         │                                       ▼          │
//!     Client Response     │  ┌──────────┐                  ┌─────────────┐   │
//!     ◀───────────────────┼──│  relay   │◀─────────────────│  forwarder  │◀──┼──── Backend
//!                         │  │ (stream) │                  │ (per-service│   │     Service
//!                         │  └──────────┘                  │   pool)     │   │
//!                         │                                └─────────────┘   │
//!                         └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use api_gateway::config::loader::{apply_env_overrides, read_config};
use api_gateway::config::GatewayConfig;
use api_gateway::lifecycle::{self, Shutdown};
use api_gateway::observability::logging::init_logging;

#[derive(Debug, Parser)]
#[command(name = "api-gateway", version, about = "Path-prefix API gateway")]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`. Takes precedence over `PORT`.
    #[arg(short, long, env = "GATEWAY_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => GatewayConfig::default(),
    };
    let overrides = apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        name = %config.name,
        "api-gateway starting"
    );
    for variable in &overrides {
        tracing::info!(variable = %variable, "Applied environment override");
    }
    tracing::info!(
        bind_address = %config.listener.bind_address,
        services = config.services.len(),
        config_file = ?cli.config,
        "Configuration loaded"
    );

    let server = lifecycle::prepare(&config)?;
    lifecycle::start_metrics(&config.observability)?;
    let listener = lifecycle::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        lifecycle::wait_for_termination().await;
        shutdown.trigger();
    });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
