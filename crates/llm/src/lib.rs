//! Generation collaborator client
//!
//! A thin, stateless completion client: system prompt and user prompt in,
//! raw text out. Providers are exposed behind the [`TextGenerator`] trait so
//! callers can inject mocks, and so "no credential configured" is a
//! construction-time decision instead of a null-check at every call site.

pub mod backend;
pub mod json;
pub mod prompt;

pub use backend::{OpenRouterBackend, TextGenerator};
pub use json::{parse_fenced_json, strip_code_fence};
pub use prompt::{Message, Role};

use thiserror::Error;

/// Generation errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation provider not configured")]
    Unavailable,

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for intake_core::Error {
    fn from(err: LlmError) -> Self {
        intake_core::Error::Llm(err.to_string())
    }
}
