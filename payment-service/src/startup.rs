//! Application startup and lifecycle management.

use crate::config::Config;
use crate::handlers;
use crate::services::{MockPaymentProvider, PaymentProvider, StripeClient};
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
    pub config: Config,
    pub payment_provider: Arc<dyn PaymentProvider>,
}

impl AppState {
    pub fn new(config: Config, payment_provider: Arc<dyn PaymentProvider>) -> Self {
        Self {
            config,
            payment_provider,
        }
    }
}

/// Stripe when enabled, otherwise the mock. The mock is never used in production.
pub fn build_payment_provider(
    config: &Config,
    is_prod: bool,
) -> Result<Arc<dyn PaymentProvider>, AppError> {
    if config.stripe.enabled {
        let client = StripeClient::new(config.stripe.clone());
        if !client.is_configured() {
            if is_prod {
                tracing::error!("STRIPE_SECRET_KEY is empty in production");
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "STRIPE_SECRET_KEY must be set in production"
                )));
            }
            tracing::warn!("Stripe enabled but STRIPE_SECRET_KEY is empty");
        }
        tracing::info!(api_base_url = %config.stripe.api_base_url, "Stripe payment provider initialized");
        Ok(Arc::new(client))
    } else if is_prod {
        tracing::error!("STRIPE_ENABLED is not set in production");
        Err(AppError::ConfigError(anyhow::anyhow!(
            "STRIPE_ENABLED must be true in production"
        )))
    } else {
        tracing::info!("Stripe disabled, using mock payment provider");
        Ok(Arc::new(MockPaymentProvider::new()))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/payment-intent-create",
            function_route(handlers::create_payment_intent),
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
    /// Build the application with the given configuration.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let payment_provider = build_payment_provider(&config, is_production())?;
        Self::build_with_provider(config, payment_provider).await
    }

    pub async fn build_with_provider(
        config: Config,
        payment_provider: Arc<dyn PaymentProvider>,
    ) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!(
            "Payment service: HTTP on port {} (provider: {})",
            http_port,
            payment_provider.name()
        );

        Ok(Self {
            http_port,
            http_listener,
            state: AppState::new(config, payment_provider),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until stopped.
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
