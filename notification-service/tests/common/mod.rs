#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use notification_service::config::{FcmConfig, NotificationConfig, DEFAULT_FCM_API_BASE_URL};
use notification_service::services::MockPushProvider;
use notification_service::startup::{build_router, AppState, Application};
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/test_rsa_key.pem");
pub const TEST_CLIENT_EMAIL: &str = "push-sender@test-project.iam.gserviceaccount.com";

pub fn test_config(fcm: FcmConfig) -> NotificationConfig {
    NotificationConfig {
        common: CoreConfig {
            port: 0, // Random port
            log_level: "info".to_string(),
            otlp_endpoint: None,
        },
        fcm,
    }
}

pub fn disabled_fcm() -> FcmConfig {
    FcmConfig {
        project_id: String::new(),
        service_account_key: Secret::new(String::new()),
        api_base_url: DEFAULT_FCM_API_BASE_URL.to_string(),
        enabled: false,
    }
}

/// Inline service account key whose tokens are minted at `token_uri`.
pub fn service_account_json(token_uri: &str) -> String {
    serde_json::json!({
        "type": "service_account",
        "project_id": "test-project",
        "client_email": TEST_CLIENT_EMAIL,
        "private_key": TEST_PRIVATE_KEY,
        "token_uri": token_uri,
    })
    .to_string()
}

pub fn router_with(provider: Arc<MockPushProvider>) -> Router {
    build_router(AppState::new(provider))
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
    pub provider: Arc<MockPushProvider>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let provider = Arc::new(MockPushProvider::new());

        let app = Application::build_with_provider(test_config(disabled_fcm()), provider.clone())
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
