//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, generation, payments};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Generation collaborator (OpenRouter)
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Hosted record store
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Payment processor
    #[serde(default)]
    pub payments: PaymentsConfig,

    /// Domain availability probing
    #[serde(default)]
    pub domains: DomainsConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty list falls back to localhost
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_origins: default_cors_origins(),
            cors_enabled: true,
        }
    }
}

/// Generation collaborator configuration
///
/// `api_key` absent means canned-sequence mode: the funnel serves its fixed
/// question list and the quote estimator serves its fixed fallback quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Sent as HTTP-Referer for OpenRouter attribution
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Sent as X-Title for OpenRouter attribution
    #[serde(default = "default_app_title")]
    pub app_title: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

fn default_generation_api_key() -> Option<String> {
    std::env::var("OPENROUTER_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

fn default_generation_endpoint() -> String {
    endpoints::OPENROUTER.to_string()
}

fn default_generation_model() -> String {
    generation::DEFAULT_MODEL.to_string()
}

fn default_referer() -> String {
    generation::DEFAULT_REFERER.to_string()
}

fn default_app_title() -> String {
    generation::DEFAULT_APP_TITLE.to_string()
}

fn default_max_tokens() -> usize {
    generation::DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    generation::DEFAULT_TEMPERATURE
}

fn default_generation_timeout() -> u64 {
    generation::DEFAULT_TIMEOUT_SECS
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: default_generation_api_key(),
            endpoint: default_generation_endpoint(),
            model: default_generation_model(),
            referer: default_referer(),
            app_title: default_app_title(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

/// Record store configuration (PostgREST-style hosted datastore)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enable the hosted store (false = in-memory only)
    #[serde(default = "default_persistence_enabled")]
    pub enabled: bool,

    #[serde(default = "default_rest_url")]
    pub rest_url: String,

    #[serde(default = "default_service_key")]
    pub service_key: String,

    #[serde(default = "default_persistence_timeout")]
    pub timeout_secs: u64,
}

fn default_persistence_enabled() -> bool {
    std::env::var("SUPABASE_URL").map(|v| !v.is_empty()).unwrap_or(false)
}

fn default_rest_url() -> String {
    std::env::var("SUPABASE_URL").unwrap_or_default()
}

fn default_service_key() -> String {
    std::env::var("SUPABASE_SERVICE_KEY").unwrap_or_default()
}

fn default_persistence_timeout() -> u64 {
    10
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_persistence_enabled(),
            rest_url: default_rest_url(),
            service_key: default_service_key(),
            timeout_secs: default_persistence_timeout(),
        }
    }
}

/// Payment processor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    /// Secret API key; absent disables checkout-session creation
    #[serde(default = "default_payments_secret")]
    pub secret_key: Option<String>,

    /// Webhook signing secret; absent disables the webhook endpoint
    #[serde(default = "default_webhook_secret")]
    pub webhook_secret: Option<String>,

    #[serde(default = "default_payments_endpoint")]
    pub endpoint: String,

    /// Frontend base URL for checkout success/cancel redirects
    #[serde(default = "default_app_url")]
    pub app_url: String,

    /// Share of the quoted price collected up front
    #[serde(default = "default_deposit_fraction")]
    pub deposit_fraction: f64,
}

fn default_payments_secret() -> Option<String> {
    std::env::var("STRIPE_SECRET_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

fn default_webhook_secret() -> Option<String> {
    std::env::var("STRIPE_WEBHOOK_SECRET")
        .ok()
        .filter(|k| !k.is_empty())
}

fn default_payments_endpoint() -> String {
    endpoints::STRIPE.to_string()
}

fn default_app_url() -> String {
    std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn default_deposit_fraction() -> f64 {
    payments::DEPOSIT_FRACTION
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            secret_key: default_payments_secret(),
            webhook_secret: default_webhook_secret(),
            endpoint: default_payments_endpoint(),
            app_url: default_app_url(),
            deposit_fraction: default_deposit_fraction(),
        }
    }
}

/// Domain availability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainsConfig {
    #[serde(default = "default_rdap_endpoint")]
    pub rdap_endpoint: String,

    #[serde(default = "default_domains_timeout")]
    pub timeout_secs: u64,
}

fn default_rdap_endpoint() -> String {
    endpoints::RDAP.to_string()
}

fn default_domains_timeout() -> u64 {
    5
}

impl Default for DomainsConfig {
    fn default() -> Self {
        Self {
            rdap_endpoint: default_rdap_endpoint(),
            timeout_secs: default_domains_timeout(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a generation credential is configured (live mode)
    pub fn generation_enabled(&self) -> bool {
        self.generation.api_key.is_some()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "generation.temperature".to_string(),
                message: format!(
                    "Must be between 0.0 and 2.0, got {}",
                    self.generation.temperature
                ),
            });
        }

        if self.generation.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generation.max_tokens".to_string(),
                message: "Must be greater than zero".to_string(),
            });
        }

        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generation.timeout_secs".to_string(),
                message: "Generation calls need a bounded timeout".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.payments.deposit_fraction)
            || self.payments.deposit_fraction == 0.0
        {
            return Err(ConfigError::InvalidValue {
                field: "payments.deposit_fraction".to_string(),
                message: format!(
                    "Must be in (0.0, 1.0], got {}",
                    self.payments.deposit_fraction
                ),
            });
        }

        if self.persistence.enabled {
            if self.persistence.rest_url.is_empty() {
                return Err(ConfigError::MissingField(
                    "persistence.rest_url".to_string(),
                ));
            }
            if self.persistence.service_key.is_empty() {
                return Err(ConfigError::MissingField(
                    "persistence.service_key".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Load settings from config files and environment
///
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("INTAKE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn bad_temperature_rejected() {
        let mut settings = Settings::default();
        settings.generation.temperature = 3.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_deposit_fraction_rejected() {
        let mut settings = Settings::default();
        settings.payments.deposit_fraction = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn enabled_persistence_requires_credentials() {
        let mut settings = Settings::default();
        settings.persistence.enabled = true;
        settings.persistence.rest_url = String::new();
        settings.persistence.service_key = String::new();
        assert!(settings.validate().is_err());

        settings.persistence.rest_url = "https://example.supabase.co".to_string();
        settings.persistence.service_key = "service-role-key".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn environment_wire_names() {
        let env: RuntimeEnvironment = serde_json::from_str(r#""production""#).unwrap();
        assert!(env.is_production());
    }
}
