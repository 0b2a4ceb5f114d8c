use super::{CreateIntent, PaymentIntent, PaymentProvider, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Returns synthetic intents. Used when Stripe is disabled and in tests.
pub struct MockPaymentProvider {
    failure: Option<String>,
    call_count: AtomicU64,
    /// Only set by `recording()`.
    requests: Option<Mutex<Vec<CreateIntent>>>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self {
            failure: None,
            call_count: AtomicU64::new(0),
            requests: None,
        }
    }

    /// Keeps every requested intent for later inspection. Tests only: the
    /// log is never trimmed.
    pub fn recording() -> Self {
        Self {
            requests: Some(Mutex::new(Vec::new())),
            ..Self::new()
        }
    }

    /// Every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every intent requested so far, in order. Empty unless built with `recording()`.
    pub fn requests(&self) -> Vec<CreateIntent> {
        self.requests
            .as_ref()
            .map(|requests| {
                requests
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .clone()
            })
            .unwrap_or_default()
    }
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_intent(&self, intent: &CreateIntent) -> Result<PaymentIntent, ProviderError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(requests) = &self.requests {
            requests
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(intent.clone());
        }

        if let Some(failure) = &self.failure {
            return Err(ProviderError::Rejected(failure.clone()));
        }

        tracing::info!(
            amount = intent.amount,
            currency = %intent.currency,
            "[MOCK] Payment intent would be created"
        );

        let id = format!("pi_mock_{}", count);
        Ok(PaymentIntent {
            client_secret: format!("{}_secret_mock", id),
            id,
        })
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
