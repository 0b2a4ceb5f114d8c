//! Stripe payment provider client.
//!
//! Implements the PaymentIntents create call over Stripe's form-encoded REST API.

use super::{CreateIntent, PaymentIntent, PaymentProvider, ProviderError};
use crate::config::StripeConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;

/// Stripe client for interacting with the Stripe API.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

/// Response from PaymentIntent creation.
#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    client_secret: Option<String>,
    #[serde(default)]
    amount: u64,
    #[serde(default)]
    currency: String,
    #[serde(default)]
    status: String,
}

/// Stripe API error response.
#[derive(Debug, Deserialize)]
struct StripeError {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn payment_intents_url(&self) -> String {
        format!(
            "{}/payment_intents",
            self.config.api_base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_intent(&self, intent: &CreateIntent) -> Result<PaymentIntent, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::Configuration(
                "Stripe secret key is not configured".to_string(),
            ));
        }

        let mut form = vec![
            ("amount", intent.amount.to_string()),
            ("currency", intent.currency.to_ascii_lowercase()),
        ];
        for method_type in &intent.payment_method_types {
            form.push(("payment_method_types[]", method_type.clone()));
        }

        let response = self
            .client
            .post(self.payment_intents_url())
            .bearer_auth(self.config.secret_key.expose_secret())
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(format!("Failed to connect to Stripe: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::Connection(format!("Failed to read Stripe response: {}", e))
        })?;

        if !status.is_success() {
            let error = serde_json::from_str::<StripeError>(&body).ok();
            tracing::warn!(
                status = %status,
                error_type = ?error.as_ref().and_then(|e| e.error.kind.as_deref()),
                error_code = ?error.as_ref().and_then(|e| e.error.code.as_deref()),
                "Stripe rejected payment intent"
            );

            let message = error
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| format!("Stripe API returned error status {}", status));
            return Err(ProviderError::Rejected(message));
        }

        let created: StripePaymentIntent = serde_json::from_str(&body).map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse Stripe response: {}", e))
        })?;

        let client_secret = created.client_secret.ok_or_else(|| {
            ProviderError::InvalidResponse("Stripe response has no client_secret".to_string())
        })?;

        tracing::info!(
            payment_intent_id = %created.id,
            amount = created.amount,
            currency = %created.currency,
            status = %created.status,
            "Stripe payment intent created"
        );

        Ok(PaymentIntent {
            id: created.id,
            client_secret,
        })
    }

    /// Check if Stripe is configured (secret key is set).
    fn is_configured(&self) -> bool {
        !self.config.secret_key.expose_secret().is_empty()
    }

    fn name(&self) -> &'static str {
        "stripe"
    }
}
