pub mod metrics;
pub mod providers;

pub use self::metrics::record_notification;
pub use providers::{
    FcmProvider, MockPushProvider, ProviderError, PushProvider, ServiceAccountKey, TokenSource,
};
