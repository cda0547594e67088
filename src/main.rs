//! variant-edge binary.
//!
//! Loads an optional TOML config, installs logging, and serves until Ctrl+C.

use std::path::PathBuf;

use clap::Parser;

use variant_edge::config::{load_config, validation::validate_config, ConfigError, EdgeConfig};
use variant_edge::lifecycle::{self, Shutdown};
use variant_edge::observability::logging;

#[derive(Parser)]
#[command(name = "variant-edge")]
#[command(about = "Sticky A/B variant edge handler", long_about = None, version)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability);

    tracing::info!("variant-edge v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        catalog_url = %config.catalog.url,
        request_timeout_secs = config.timeouts.request_secs,
        config_file = ?cli.config,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    lifecycle::start(config, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
