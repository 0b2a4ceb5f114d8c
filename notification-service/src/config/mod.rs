use secrecy::Secret;
use service_core::config::{self as core_config, get_env, get_flag, is_production};
use service_core::error::AppError;

pub const DEFAULT_FCM_API_BASE_URL: &str = "https://fcm.googleapis.com/v1/projects";

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub common: core_config::Config,
    pub fcm: FcmConfig,
}

#[derive(Debug, Clone)]
pub struct FcmConfig {
    /// Overrides the `project_id` found in the service account key.
    pub project_id: String,
    /// Service account key as inline JSON or as a path to the JSON file.
    pub service_account_key: Secret<String>,
    pub api_base_url: String,
    pub enabled: bool,
}

impl NotificationConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = is_production();

        Ok(NotificationConfig {
            common: common_config,
            fcm: FcmConfig {
                project_id: get_env("FCM_PROJECT_ID", Some(""), is_prod)?,
                service_account_key: Secret::new(get_env(
                    "FCM_SERVICE_ACCOUNT_KEY",
                    Some(""),
                    is_prod,
                )?),
                api_base_url: get_env("FCM_API_BASE_URL", Some(DEFAULT_FCM_API_BASE_URL), false)?,
                enabled: get_flag("FCM_ENABLED"),
            },
        })
    }
}
