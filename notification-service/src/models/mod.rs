pub mod message;
pub mod notification;

pub use message::{AndroidConfig, AndroidPriority, ApnsConfig, MessageNotification, PushMessage};
pub use notification::{
    validate_notification, NotificationRequest, RequestError, SendNotificationResponse,
    MISSING_FIELDS_MESSAGE,
};
