//! Message envelope handed to the messaging provider.
//!
//! Serializes to the `message` object of the FCM HTTP v1 `messages:send` call.

use crate::models::NotificationRequest;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub token: String,
    pub notification: MessageNotification,
    pub android: AndroidConfig,
    pub apns: ApnsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidConfig {
    pub priority: AndroidPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AndroidPriority {
    Normal,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aps {
    pub sound: String,
}

impl ApnsConfig {
    pub fn with_sound(sound: impl Into<String>) -> Self {
        Self {
            payload: ApnsPayload {
                aps: Aps {
                    sound: sound.into(),
                },
            },
        }
    }
}

impl From<NotificationRequest> for PushMessage {
    /// High priority on Android, default sound on Apple devices.
    fn from(request: NotificationRequest) -> Self {
        Self {
            token: request.token,
            notification: MessageNotification {
                title: request.title,
                body: request.body,
            },
            android: AndroidConfig {
                priority: AndroidPriority::High,
            },
            apns: ApnsConfig::with_sound("default"),
        }
    }
}
