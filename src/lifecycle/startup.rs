//! Startup orchestration.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::EdgeConfig;
use crate::http::HttpServer;
use crate::observability::metrics;
use crate::rewrite::RewriteError;
use crate::upstream::FetchError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to configure rewriter: {0}")]
    Rewriter(#[from] RewriteError),

    #[error("failed to configure upstream client: {0}")]
    Client(#[from] FetchError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Build every subsystem from `config` and serve until `shutdown` fires.
pub async fn start(config: EdgeConfig, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    server.run(listener, shutdown).await.map_err(StartupError::Serve)
}
