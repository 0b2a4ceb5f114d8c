//! HTTP handlers for notification-service.

pub mod health;
pub mod send;

pub use health::{health_check, metrics, readiness_check};
pub use send::send_notification;
