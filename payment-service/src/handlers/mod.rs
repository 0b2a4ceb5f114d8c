//! HTTP handlers for payment-service.

pub mod health;
pub mod payment_intent;

pub use health::{health_check, metrics, readiness_check};
pub use payment_intent::create_payment_intent;
