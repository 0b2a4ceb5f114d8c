use super::{ProviderError, PushProvider, ServiceAccountKey, TokenSource};
use crate::config::FcmConfig;
use crate::models::PushMessage;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub struct FcmProvider {
    client: Client,
    tokens: TokenSource,
    project_id: String,
    api_base_url: String,
}

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    message: &'a PushMessage,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FcmErrorResponse {
    error: FcmError,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct FcmError {
    code: i32,
    message: String,
    #[serde(default)]
    status: String,
}

impl FcmProvider {
    pub fn new(config: &FcmConfig) -> Result<Self, ProviderError> {
        let key = ServiceAccountKey::load(config.service_account_key.expose_secret())?;

        let project_id = if config.project_id.is_empty() {
            key.project_id.clone().unwrap_or_default()
        } else {
            config.project_id.clone()
        };

        if project_id.is_empty() {
            return Err(ProviderError::Configuration(
                "FCM project_id is not configured".to_string(),
            ));
        }

        let client = Client::new();

        Ok(Self {
            tokens: TokenSource::new(client.clone(), key),
            client,
            project_id,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

#[async_trait]
impl PushProvider for FcmProvider {
    async fn send(&self, message: &PushMessage) -> Result<String, ProviderError> {
        let access_token = self.tokens.access_token().await?;

        let url = format!("{}/{}/messages:send", self.api_base_url, self.project_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&FcmRequest { message })
            .send()
            .await
            .map_err(|e| ProviderError::Connection(format!("Failed to connect to FCM: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::Connection(format!("Failed to read FCM response: {}", e))
        })?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<FcmErrorResponse>(&body) {
                Ok(error) => ProviderError::SendFailed(error.error.message),
                Err(_) => ProviderError::SendFailed(format!(
                    "FCM API returned error status {}: {}",
                    status, body
                )),
            });
        }

        let fcm_response: FcmResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::SendFailed(format!("Failed to parse FCM response: {}", e))
        })?;

        tracing::info!(
            project_id = %self.project_id,
            message_id = %fcm_response.name,
            "Push notification sent via FCM"
        );

        Ok(fcm_response.name)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.tokens.access_token().await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "fcm"
    }
}

/// Logs instead of sending. Used when FCM is disabled and in tests.
pub struct MockPushProvider {
    failure: Option<String>,
    send_count: AtomicU64,
}

impl MockPushProvider {
    pub fn new() -> Self {
        Self {
            failure: None,
            send_count: AtomicU64::new(0),
        }
    }

    /// Every send fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            send_count: AtomicU64::new(0),
        }
    }

    /// Number of send attempts, failed ones included.
    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }
}

impl Default for MockPushProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    async fn send(&self, message: &PushMessage) -> Result<String, ProviderError> {
        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(failure) = &self.failure {
            return Err(ProviderError::SendFailed(failure.clone()));
        }

        tracing::info!(
            title = %message.notification.title,
            "[MOCK] Push notification would be sent"
        );

        Ok(format!("projects/mock/messages/mock-push-{}", count))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
