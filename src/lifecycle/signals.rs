//! OS signal handling.

use tokio::sync::broadcast;

/// Resolve when Ctrl+C arrives or the [`Shutdown`](super::Shutdown) coordinator fires.
pub async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received, shutting down"),
        _ = shutdown.recv() => tracing::info!("Shutdown triggered"),
    }
}
