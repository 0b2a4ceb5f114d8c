pub mod currency;
pub mod metrics;
pub mod mock;
pub mod stripe;

use async_trait::async_trait;
use thiserror::Error;

pub use currency::{to_minor_units, CurrencyError};
pub use self::metrics::record_payment_intent;
pub use mock::MockPaymentProvider;
pub use stripe::StripeClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    /// The provider refused the request. Holds the provider's own wording.
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Parameters of a payment intent, amount already in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIntent {
    pub amount: u64,
    pub currency: String,
    pub payment_method_types: Vec<String>,
}

/// Provider-side payment intent. Only the parts the caller needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Payment client used by the payment-intent-create function.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_intent(&self, intent: &CreateIntent) -> Result<PaymentIntent, ProviderError>;
    fn is_configured(&self) -> bool;
    /// Short label for logs and metrics.
    fn name(&self) -> &'static str;
}
