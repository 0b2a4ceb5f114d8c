pub mod google_auth;
pub mod push;

use crate::models::PushMessage;
use async_trait::async_trait;
use thiserror::Error;

pub use google_auth::{ServiceAccountKey, TokenSource};
pub use push::{FcmProvider, MockPushProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The provider rejected the message. Holds the provider's own wording.
    #[error("{0}")]
    SendFailed(String),
}

/// Messaging client used by the notification-send function.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Submit the message once and return the provider-assigned message id.
    async fn send(&self, message: &PushMessage) -> Result<String, ProviderError>;
    async fn health_check(&self) -> Result<(), ProviderError>;
    /// Short label for logs and metrics.
    fn name(&self) -> &'static str;
}
