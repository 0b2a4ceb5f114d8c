//! Payment intent handler.
//!
//! Card payments become a provider payment intent; cash payments are
//! acknowledged without contacting the provider.

use axum::{body::Bytes, extract::State, Json};
use service_core::error::AppError;

use crate::dtos::{validate_payment, PaymentIntentResponse, PaymentMethod, UNSUPPORTED_METHOD_MESSAGE};
use crate::services::metrics::record_payment_amount;
use crate::services::{record_payment_intent, to_minor_units, CreateIntent};
use crate::startup::AppState;

/// `POST /payment-intent-create`
#[tracing::instrument(skip(state, body))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let request = validate_payment(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected payment request");
        AppError::ValidationError(e.client_message().to_string())
    })?;

    let method = request.method().map_err(|e| {
        tracing::warn!(error = %e, "Rejected payment request");
        record_payment_intent("unsupported", "rejected");
        AppError::UnsupportedOption(UNSUPPORTED_METHOD_MESSAGE.to_string())
    })?;

    match method {
        PaymentMethod::Cash => {
            record_payment_intent(method.as_str(), "acknowledged");
            tracing::info!(currency = %request.currency, "Cash payment acknowledged");
            Ok(Json(PaymentIntentResponse::cash()))
        }
        PaymentMethod::Card => {
            let amount = to_minor_units(request.amount, &request.currency).map_err(|e| {
                tracing::warn!(error = %e, amount = %request.amount, "Amount cannot be charged");
                AppError::ValidationError(e.to_string())
            })?;

            let intent = CreateIntent {
                amount,
                currency: request.currency.clone(),
                payment_method_types: vec![method.as_str().to_string()],
            };

            let provider = state.payment_provider.name();
            match state.payment_provider.create_intent(&intent).await {
                Ok(created) => {
                    record_payment_intent(method.as_str(), "created");
                    record_payment_amount(&request.currency, amount);
                    tracing::info!(
                        provider,
                        payment_intent_id = %created.id,
                        amount,
                        currency = %request.currency,
                        "Payment intent created"
                    );
                    Ok(Json(PaymentIntentResponse::card(created.client_secret)))
                }
                Err(e) => {
                    record_payment_intent(method.as_str(), "failed");
                    tracing::error!(provider, error = %e, "Error creating payment intent");
                    Err(AppError::ProviderError(e.to_string()))
                }
            }
        }
    }
}
