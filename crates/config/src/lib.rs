//! Configuration management for the intake backend
//!
//! Supports loading configuration from:
//! - YAML files (`config/default.yaml`, `config/{env}.yaml`)
//! - Environment variables (`INTAKE__` prefix)
//!
//! Well-known credential variables (`OPENROUTER_API_KEY`, `SUPABASE_URL`,
//! `SUPABASE_SERVICE_KEY`, `STRIPE_SECRET_KEY`, `STRIPE_WEBHOOK_SECRET`) are
//! honored as defaults so the backend runs with nothing but a `.env`.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, DomainsConfig, GenerationConfig, ObservabilityConfig,
    PaymentsConfig, PersistenceConfig, RuntimeEnvironment, ServerConfig,
    Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
