//! OAuth2 access tokens for FCM from a Google service account key.
//!
//! Implements the JWT-bearer grant: an RS256 assertion signed with the
//! account's private key is exchanged at `token_uri` for a short-lived
//! access token, which is cached until shortly before it expires.

use super::ProviderError;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::Mutex;

pub const FIREBASE_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the cached token expires.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: Secret<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Parse the key from inline JSON, or read it from the file at `raw`.
    pub fn load(raw: &str) -> Result<Self, ProviderError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ProviderError::Configuration(
                "FCM service account key is not configured".to_string(),
            ));
        }

        let json = if raw.starts_with('{') {
            raw.to_string()
        } else {
            std::fs::read_to_string(raw).map_err(|e| {
                ProviderError::Configuration(format!(
                    "Failed to read service account key file {}: {}",
                    raw, e
                ))
            })?
        };

        serde_json::from_str(&json).map_err(|e| {
            ProviderError::Configuration(format!("Invalid service account key: {}", e))
        })
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

struct CachedToken {
    access_token: Secret<String>,
    expires_at: i64,
}

pub struct TokenSource {
    client: Client,
    key: ServiceAccountKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(client: Client, key: ServiceAccountKey) -> Self {
        Self {
            client,
            key,
            cached: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// A valid access token, fetching a new one when the cached token is stale.
    pub async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - REFRESH_MARGIN_SECS > now {
                return Ok(token.access_token.expose_secret().clone());
            }
        }

        let token = self.fetch(now).await?;
        let access_token = token.access_token.expose_secret().clone();
        *cached = Some(token);

        Ok(access_token)
    }

    fn assertion(&self, now: i64) -> Result<String, ProviderError> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: FIREBASE_MESSAGING_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.expose_secret().as_bytes())
            .map_err(|e| {
                ProviderError::Configuration(format!("Invalid service account private key: {}", e))
            })?;

        encode(&Header::new(Algorithm::RS256), &claims, &signing_key).map_err(|e| {
            ProviderError::Authentication(format!("Failed to sign token request: {}", e))
        })
    }

    async fn fetch(&self, now: i64) -> Result<CachedToken, ProviderError> {
        let assertion = self.assertion(now)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                ProviderError::Connection(format!("Failed to reach token endpoint: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::Connection(format!("Failed to read token response: {}", e))
        })?;

        if !status.is_success() {
            let reason = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| e.error_description.unwrap_or(e.error))
                .unwrap_or_else(|_| format!("token endpoint returned {}", status));
            return Err(ProviderError::Authentication(reason));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::Authentication(format!("Failed to parse token response: {}", e))
        })?;

        tracing::debug!(
            client_email = %self.key.client_email,
            expires_in = token.expires_in,
            "Fetched FCM access token"
        );

        Ok(CachedToken {
            access_token: Secret::new(token.access_token),
            expires_at: now + token.expires_in,
        })
    }
}
