//! Notification counters, exported through the process-wide Prometheus recorder.

use metrics::counter;

/// Count one dispatch attempt by provider and outcome (`sent` / `failed`).
pub fn record_notification(provider: &'static str, status: &'static str) {
    counter!(
        "notifications_sent_total",
        "provider" => provider,
        "status" => status
    )
    .increment(1);
}
