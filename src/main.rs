//! # Evidence Search Server Main Driver
//!
//! ## Purpose
//! Entry point for the evidence-search server. Loads configuration,
//! initializes logging, constructs the pipeline, and serves the search API.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Construct the pipeline over the configured providers
//! 4. Start the web API server
//! 5. Handle shutdown signals gracefully

use anyhow::Context;
use clap::{Arg, Command};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use evidence_search::{api::ApiServer, config::Config, pipeline::SearchPipeline, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("evidence-search-server")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Legal Search Team")
        .about("Retrieval and ranking engine for evidentiary case-law research")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("check-health")
                .long("check-health")
                .help("Validate configuration and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();
    let mut config = Config::from_file(config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    let config = Arc::new(config);

    init_logging(&config)?;

    info!("Starting Evidence Search v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", config_path);

    if matches.get_flag("check-health") {
        // Config parsed and validated; provider credentials are checked
        // lazily per request, so there is nothing further to probe offline
        info!("Configuration is valid");
        return Ok(());
    }

    let pipeline = Arc::new(
        SearchPipeline::from_config(&config).context("constructing search pipeline")?,
    );
    let app_state = AppState {
        config: config.clone(),
        pipeline,
    };

    let server = ApiServer::new(app_state);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Server error: {}", e);
        }
    });

    info!(
        "Evidence Search started on {}:{}",
        config.server.host, config.server.port
    );

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = server_handle => {
            warn!("Server stopped unexpectedly");
        }
    }

    info!("Evidence Search shut down");
    Ok(())
}

/// Initialize logging and tracing from configuration
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    if config.logging.json_format {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    Ok(())
}
