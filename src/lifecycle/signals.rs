//! OS signal handling.

/// Resolve when the process receives Ctrl+C / SIGINT.
pub async fn wait_for_shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C; shutting down");
        return;
    }
    tracing::info!("Shutdown signal received");
}
