//! HTTP server lifecycle

use std::net::SocketAddr;

use tokio::sync::mpsc;
use tracing::info;

use crate::error::{WebServerError, WebServerResult};
use crate::state::AppState;
use crate::web;

pub struct WebServer {
    state: AppState,
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl WebServer {
    pub fn new(state: AppState) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        Self {
            state,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Sender that triggers graceful shutdown when a message arrives
    pub fn get_shutdown_sender(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Serve until shutdown is requested
    pub async fn run(self, addr: SocketAddr) -> WebServerResult<()> {
        let Self {
            state,
            mut shutdown_rx,
            ..
        } = self;
        let app = web::router(state);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("bind {}: {}", addr, e)))?;
        info!("🌐 Test bridge HTTP server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;
        Ok(())
    }
}
