//! HTTP server startup logic.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;

use crate::config::{AppConfig, SHUTDOWN_GRACE_SECS};

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    Address(String),

    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Start the HTTP server based on configuration.
///
/// This function blocks until the server shuts down. After a shutdown
/// signal, in-flight requests get `SHUTDOWN_GRACE_SECS` to finish.
pub async fn start_server(app: Router, config: &AppConfig) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.http.host, config.http.port)
        .parse()
        .map_err(|e| ServerError::Address(format!("Invalid http.host or http.port: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Starting HTTP server");

    let (draining_tx, draining_rx) = watch::channel(false);

    let serve = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown::shutdown_signal().await;
                let _ = draining_tx.send(true);
            })
            .await
    };

    tokio::select! {
        result = serve => result.map_err(|e| ServerError::Server(e.to_string())),
        _ = drain_deadline(draining_rx, Duration::from_secs(SHUTDOWN_GRACE_SECS)) => {
            tracing::warn!(
                grace_secs = SHUTDOWN_GRACE_SECS,
                "Connections still open after grace period, forcing shutdown"
            );
            Ok(())
        }
    }
}

/// Resolves `grace` after draining starts. Never resolves if it doesn't.
async fn drain_deadline(mut draining: watch::Receiver<bool>, grace: Duration) {
    let stopped = draining.wait_for(|started| *started).await.is_err();
    if stopped {
        // Sender dropped without draining: the server already stopped
        std::future::pending::<()>().await;
    }
    tracing::info!(
        grace_secs = grace.as_secs(),
        "Graceful shutdown initiated, waiting for connections to close"
    );
    tokio::time::sleep(grace).await;
}
