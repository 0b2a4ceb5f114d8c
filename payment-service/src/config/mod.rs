use secrecy::Secret;
use service_core::config::{self as core_config, get_env, get_flag, is_production};
use service_core::error::AppError;

pub const DEFAULT_STRIPE_API_BASE_URL: &str = "https://api.stripe.com/v1";

#[derive(Clone, Debug)]
pub struct Config {
    pub common: core_config::Config,
    pub stripe: StripeConfig,
    pub service_name: String,
}

#[derive(Clone, Debug)]
pub struct StripeConfig {
    /// Never logged and never returned to callers.
    pub secret_key: Secret<String>,
    pub api_base_url: String,
    pub enabled: bool,
}

impl Config {
    /// Resolve configuration once at startup; handlers never read the environment.
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = is_production();

        Ok(Self {
            common,
            stripe: StripeConfig {
                secret_key: Secret::new(get_env("STRIPE_SECRET_KEY", Some(""), is_prod)?),
                api_base_url: get_env(
                    "STRIPE_API_BASE_URL",
                    Some(DEFAULT_STRIPE_API_BASE_URL),
                    false,
                )?,
                enabled: get_flag("STRIPE_ENABLED"),
            },
            service_name: "payment-service".to_string(),
        })
    }
}
