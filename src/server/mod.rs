//! The companion HTTP server.

pub mod routes;
pub mod state;
pub mod watch;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::core::config::{ExplorerConfig, ServerConfig};
use crate::core::errors::Result;

pub use routes::{router, ApiError};
pub use state::AppState;
pub use watch::{spawn_reloader, FileWatcher};

/// Binds, serves until Ctrl-C, and watches the docs root when asked to.
pub async fn serve(server: ServerConfig, explorer: ExplorerConfig) -> Result<()> {
    let bind_addr = server.bind_addr();
    let watch = server.watch && server.tree_json.is_none();
    let state = Arc::new(AppState::load(server, explorer).await);

    let _watcher = if watch {
        match spawn_reloader(state.clone()) {
            Ok((watcher, _)) => Some(watcher),
            Err(e) => {
                tracing::warn!("File watching disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    let listener = TcpListener::bind(&bind_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!("Serving {} on http://{}", state.server.docs_root.display(), addr);
    tracing::info!("API health check: http://{}/api/health", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
