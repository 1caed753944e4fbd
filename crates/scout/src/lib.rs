//! AI services for the intake backend
//!
//! Three services share one injected generation collaborator:
//! - [`DiscoveryFunnel`] - the adaptive scoping questionnaire ("Dungeon
//!   Master"): phase-sequenced question generation with topic
//!   deduplication, a fixed step budget and total fallback behavior
//! - [`QuoteEstimator`] - the Scout estimator persona producing price quotes
//! - [`DomainSuggester`] - alternative domain-name ideas when a requested
//!   domain is taken
//!
//! All three are total: a missing credential or a failed generation call
//! degrades to fixed content, never to an error. A scoping conversation must
//! not visibly break because a language model hiccupped.

pub mod discovery;
pub mod domains;
pub mod quote;

pub use discovery::phase::Phase;
pub use discovery::topic::{covered_topics, Topic};
pub use discovery::{DiscoveryFunnel, TOTAL_STEPS};
pub use domains::DomainSuggester;
pub use quote::{QuoteEstimator, QuoteRequest};
