//! Persistence error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            PersistenceError::Connection(err.to_string())
        } else {
            PersistenceError::Query(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

impl From<PersistenceError> for intake_core::Error {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(what) => intake_core::Error::NotFound(what),
            PersistenceError::Unauthorized => intake_core::Error::Unauthorized,
            other => intake_core::Error::Persistence(other.to_string()),
        }
    }
}
