//! HTTP plumbing shared by the function services.
//!
//! Each function is a single POST endpoint. Every other verb on the same path
//! is answered with a plain-text 405 before the handler (and therefore any
//! body parsing or provider call) runs.

use crate::error::AppError;
use axum::{
    handler::Handler,
    routing::{MethodRouter, post},
};
use tokio::signal;

/// Fallback for any non-POST request on a function path.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Route a function handler: POST dispatches to `handler`, anything else is a 405.
pub fn function_route<H, T, S>(handler: H) -> MethodRouter<S>
where
    H: Handler<T, S>,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    post(handler).fallback(method_not_allowed)
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
