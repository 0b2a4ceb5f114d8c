//! Application startup and lifecycle management.
//!
//! One HTTP listener carries the notification-send function plus the
//! health, readiness and metrics endpoints.

use crate::config::NotificationConfig;
use crate::handlers;
use crate::services::{FcmProvider, MockPushProvider, PushProvider};
use axum::{middleware::from_fn, routing::get, Router};
use service_core::config::is_production;
use service_core::error::AppError;
use service_core::http::{function_route, shutdown_signal};
use service_core::middleware::{make_request_span, metrics_middleware, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub push_provider: Arc<dyn PushProvider>,
}

impl AppState {
    pub fn new(push_provider: Arc<dyn PushProvider>) -> Self {
        Self { push_provider }
    }
}

/// Pick the messaging client the configuration asks for.
///
/// The mock is never used in production.
pub fn build_push_provider(
    config: &NotificationConfig,
    is_prod: bool,
) -> Result<Arc<dyn PushProvider>, AppError> {
    if config.fcm.enabled {
        let provider = FcmProvider::new(&config.fcm).map_err(|e| {
            tracing::error!("Failed to initialize FCM provider: {}", e);
            AppError::ConfigError(anyhow::anyhow!(e))
        })?;
        tracing::info!(project_id = %provider.project_id(), "FCM push provider initialized");
        Ok(Arc::new(provider))
    } else if is_prod {
        tracing::error!("FCM_ENABLED is not set in production");
        Err(AppError::ConfigError(anyhow::anyhow!(
            "FCM_ENABLED must be true in production"
        )))
    } else {
        tracing::info!("FCM provider disabled, using mock push provider");
        Ok(Arc::new(MockPushProvider::new()))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/notification-send",
            function_route(handlers::send_notification),
        )
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the provider selected by `config`.
    pub async fn build(config: NotificationConfig) -> Result<Self, AppError> {
        let push_provider = build_push_provider(&config, is_production())?;
        Self::build_with_provider(config, push_provider).await
    }

    /// Build the application around an already constructed messaging client.
    pub async fn build_with_provider(
        config: NotificationConfig,
        push_provider: Arc<dyn PushProvider>,
    ) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!("Notification service: HTTP on port {}", http_port);

        Ok(Self {
            http_port,
            http_listener,
            state: AppState::new(push_provider),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.http_listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
