//! Always-OK liveness endpoint for the pod's own probes.

use std::net::SocketAddr;

use axum::Router;
use svcping_health::Shutdown;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Router answering every method and path with `200 ok`.
pub fn router() -> Router {
    Router::new().fallback(ok)
}

async fn ok() -> &'static str {
    "ok"
}

/// Bind `addr` and serve until shutdown.
///
/// Failures are logged only; the checkers keep running without it.
pub async fn serve(addr: SocketAddr, shutdown: Shutdown) {
    match TcpListener::bind(addr).await {
        Ok(listener) => serve_on(listener, shutdown).await,
        Err(e) => error!(%addr, error = %e, "http server failed"),
    }
}

pub async fn serve_on(listener: TcpListener, shutdown: Shutdown) {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "liveness server listening");
    }

    let result = axum::serve(listener, router())
        .with_graceful_shutdown(async move { shutdown.triggered().await })
        .await;
    if let Err(e) = result {
        error!(error = %e, "http server failed");
    }
}
