use axum::{body::Bytes, extract::State, Json};
use service_core::error::AppError;

use crate::models::{
    validate_notification, PushMessage, SendNotificationResponse, MISSING_FIELDS_MESSAGE,
};
use crate::services::record_notification;
use crate::startup::AppState;

/// `POST /notification-send`
///
/// Submits the notification exactly once. Provider failures are not retried.
#[tracing::instrument(skip(state, body))]
pub async fn send_notification(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SendNotificationResponse>, AppError> {
    let request = validate_notification(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected notification request");
        AppError::BadRequest(MISSING_FIELDS_MESSAGE.to_string())
    })?;

    let message = PushMessage::from(request);
    let provider = state.push_provider.name();

    match state.push_provider.send(&message).await {
        Ok(message_id) => {
            record_notification(provider, "sent");
            tracing::info!(provider, message_id = %message_id, "Notification sent");
            Ok(Json(SendNotificationResponse::new(message_id)))
        }
        Err(e) => {
            record_notification(provider, "failed");
            tracing::error!(provider, error = %e, "Error sending notification");
            Err(AppError::ProviderError(e.to_string()))
        }
    }
}
