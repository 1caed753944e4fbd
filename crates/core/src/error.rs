//! Error types shared across the intake backend

use thiserror::Error;

/// Convenience result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation error: {0}")]
    Llm(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Payment error: {0}")]
    Payment(String),

    #[error("Domain lookup error: {0}")]
    DomainLookup(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}
