//! Request and response bodies of the notification-send function.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Body of the 400 answer. The function replies in plain text here.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing token, title, or body in request.";

/// Wire shape. Fields keep whatever JSON type the caller sent.
#[derive(Debug, Deserialize)]
struct NotificationRequestBody {
    #[serde(default)]
    token: Option<serde_json::Value>,
    #[serde(default)]
    title: Option<serde_json::Value>,
    #[serde(default)]
    body: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NotificationRequest {
    #[validate(length(min = 1, message = "Device token cannot be empty"))]
    pub token: String,
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Body cannot be empty"))]
    pub body: String,
}

/// Text of a field. `null`, `false`, `0` and `""` come out empty; other
/// scalars are rendered as their JSON text.
fn field_text(value: Option<serde_json::Value>) -> String {
    use serde_json::Value;

    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Malformed request body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Decode and validate a raw request body in one step.
///
/// A body that is not a JSON object is rejected the same way as one with
/// missing fields. Present fields are not shape-checked beyond that.
pub fn validate_notification(body: &[u8]) -> Result<NotificationRequest, RequestError> {
    let raw: NotificationRequestBody = serde_json::from_slice(body)?;
    let request = NotificationRequest {
        token: field_text(raw.token),
        title: field_text(raw.title),
        body: field_text(raw.body),
    };
    request.validate()?;
    Ok(request)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub success: bool,
    pub message_id: String,
}

impl SendNotificationResponse {
    pub fn new(message_id: String) -> Self {
        Self {
            success: true,
            message_id,
        }
    }
}
