//! HTTP API server for the intake backend
//!
//! Thin request/response mapping around three external systems: the
//! generation collaborator (via `intake-scout`), the hosted record store
//! (via `intake-persistence`) and the payment processor. The only endpoint
//! with nontrivial logic behind it is `/api/discovery/next`, which drives
//! the adaptive discovery funnel.

pub mod auth;
pub mod domains;
pub mod http;
pub mod metrics;
pub mod payments;
pub mod state;

pub use http::create_router;
pub use metrics::init_metrics;
pub use state::AppState;

use thiserror::Error;

/// Server-side errors surfaced during startup
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Initialization failed: {0}")]
    Init(String),
}
