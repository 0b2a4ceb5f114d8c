use super::currency::known_currency;
use metrics::counter;

/// Count one payment-intent request by method and outcome.
pub fn record_payment_intent(payment_method: &'static str, status: &'static str) {
    counter!(
        "payment_intents_total",
        "payment_method" => payment_method,
        "status" => status
    )
    .increment(1);
}

/// Track the requested amount in minor units per currency. Unknown codes
/// share the `other` label.
pub fn record_payment_amount(currency: &str, amount_minor: u64) {
    counter!("payment_amount_total", "currency" => currency_label(currency))
        .increment(amount_minor);
}

fn currency_label(currency: &str) -> &'static str {
    known_currency(currency).unwrap_or("other")
}
