#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use payment_service::config::{Config, StripeConfig, DEFAULT_STRIPE_API_BASE_URL};
use payment_service::services::MockPaymentProvider;
use payment_service::startup::{build_router, AppState, Application};
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET_KEY: &str = "sk_test_4eC39HqLyjWDarjtT1zdp7dc";

pub fn test_config(stripe: StripeConfig) -> Config {
    Config {
        common: CoreConfig {
            port: 0, // Random port
            log_level: "info".to_string(),
            otlp_endpoint: None,
        },
        stripe,
        service_name: "payment-service".to_string(),
    }
}

pub fn disabled_stripe() -> StripeConfig {
    StripeConfig {
        secret_key: Secret::new(String::new()),
        api_base_url: DEFAULT_STRIPE_API_BASE_URL.to_string(),
        enabled: false,
    }
}

/// Stripe settings pointing at a mock server.
pub fn stripe_at(api_base_url: &str) -> StripeConfig {
    StripeConfig {
        secret_key: Secret::new(TEST_SECRET_KEY.to_string()),
        api_base_url: api_base_url.to_string(),
        enabled: true,
    }
}

pub fn router_with(provider: Arc<MockPaymentProvider>) -> Router {
    build_router(AppState::new(test_config(disabled_stripe()), provider))
}

/// Send one request through the router and return status and body text.
pub async fn call(router: Router, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub struct TestApp {
    pub http_address: String,
    pub http_port: u16,
    pub provider: Arc<MockPaymentProvider>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let provider = Arc::new(MockPaymentProvider::new());

        let app =
            Application::build_with_provider(test_config(disabled_stripe()), provider.clone())
                .await
                .expect("Failed to build test application");

        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            http_address,
            http_port,
            provider,
        }
    }
}
