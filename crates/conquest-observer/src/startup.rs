//! Observer server startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] binds the listener eagerly, so a port conflict is
//! reported at startup, and then serves on a background Tokio task while
//! the tick loop runs.

use std::sync::Arc;

use conquest_db::StateStore;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, serve};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind `0.0.0.0:{port}` and serve the Observer API on a background task.
///
/// The returned handle can be aborted on shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address cannot be bound.
pub async fn spawn_observer<S: StateStore>(
    port: u16,
    state: Arc<AppState<S>>,
) -> Result<JoinHandle<()>, StartupError> {
    let config = ServerConfig {
        host: String::from("0.0.0.0"),
        port,
    };
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(port, "Observer server spawned on background task");

    Ok(handle)
}
