//! nbpipe RPC server.
//!
//! Serves the notebook operations of `nbpipe-core` to editor extensions over
//! JSON RPC.
//!
//! # Architecture
//!
//! The server consists of:
//! - **Protocol**: request/response envelopes and status codes
//! - **Handlers**: the `nb.*` methods, run on the blocking thread pool
//! - **Routes**: `GET /health` and `POST /rpc`

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod table;

use std::net::SocketAddr;
use std::sync::Arc;

pub use error::{RpcCode, RpcError, ServerError, ServerResult};
pub use protocol::{RpcRequest, RpcResponse};
pub use routes::{AppState, create_router};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8888,
        }
    }
}

impl ServerConfig {
    /// Socket address to bind.
    pub fn addr(&self) -> ServerResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }
}

/// Run the server until Ctrl+C.
pub async fn serve(state: AppState, config: ServerConfig) -> ServerResult<()> {
    let addr = config.addr()?;
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting nbpipe server at http://{}", addr);

    // Handle Ctrl+C for graceful shutdown
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
