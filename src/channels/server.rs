//! HTTP server lifecycle.

use std::net::SocketAddr;

use axum::Router;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::HttpConfig;

/// Hosts the API router on one listener.
///
/// `start()` binds and spawns the server task; `shutdown()` stops it
/// gracefully and waits for in-flight requests.
pub struct ApiServer {
    host: String,
    port: u16,
    router: Option<Router>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ApiServer {
    pub fn new(config: &HttpConfig, router: Router) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            router: Some(router),
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Bind the listener and spawn the server. Returns the bound address,
    /// which differs from the configured one when port 0 was requested.
    pub async fn start(&mut self) -> std::io::Result<SocketAddr> {
        let Some(router) = self.router.take() else {
            return Err(std::io::Error::other("server already started"));
        };

        let listener = tokio::net::TcpListener::bind((self.host.as_str(), self.port)).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("API server listening on {}", local_addr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    tracing::info!("API server shutting down");
                })
                .await
            {
                tracing::error!("API server error: {}", e);
            }
        });

        self.handle = Some(handle);
        Ok(local_addr)
    }

    /// Signal graceful shutdown and wait for the server task to finish.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;

    use super::*;

    #[tokio::test]
    async fn test_start_serve_and_shutdown() {
        let config = HttpConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let router = Router::new().route("/ping", get(|| async { "pong" }));
        let mut server = ApiServer::new(&config, router);

        let addr = server.start().await.unwrap();
        let body = reqwest::get(format!("http://{}/ping", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "pong");

        assert!(server.start().await.is_err());
        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let config = HttpConfig {
            host: "256.0.0.1".to_string(),
            port: 0,
        };
        let mut server = ApiServer::new(&config, Router::new());
        assert!(server.start().await.is_err());
    }
}
