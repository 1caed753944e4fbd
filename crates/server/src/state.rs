//! Application State
//!
//! Shared state across all handlers. Every collaborator is constructed once
//! at startup and injected here; handlers never build clients of their own.

use std::sync::Arc;

use parking_lot::RwLock;

use intake_config::{load_settings, Settings};
use intake_llm::TextGenerator;
use intake_persistence::{InMemoryProjectStore, ProjectStore, RestClient};
use intake_scout::{DiscoveryFunnel, DomainSuggester, QuoteEstimator};

use crate::domains::DomainChecker;
use crate::payments::PaymentClient;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration wrapped in RwLock for hot-reload support
    pub config: Arc<RwLock<Settings>>,
    /// Discovery funnel engine
    pub funnel: Arc<DiscoveryFunnel>,
    /// Quote estimator
    pub quotes: Arc<QuoteEstimator>,
    /// Domain availability checker
    pub domains: Arc<DomainChecker>,
    /// Project record store
    pub projects: Arc<dyn ProjectStore>,
    /// Payment processor client; None disables checkout creation
    pub payments: Option<Arc<PaymentClient>>,
    /// Hosted datastore + identity provider client; None in in-memory
    /// development mode (auth falls back to a development identity)
    pub rest_client: Option<Arc<RestClient>>,
    /// Environment name for config reload
    env: Option<String>,
}

impl AppState {
    /// State with in-memory storage, canned generation and no payment
    /// processor. Used by tests and credential-less development.
    pub fn new(config: Settings) -> Self {
        Self::with_parts(
            config,
            None,
            Arc::new(InMemoryProjectStore::new()),
            None,
            None,
        )
    }

    /// Assemble state from explicitly constructed collaborators.
    pub fn with_parts(
        config: Settings,
        generator: Option<Arc<dyn TextGenerator>>,
        projects: Arc<dyn ProjectStore>,
        rest_client: Option<Arc<RestClient>>,
        env: Option<String>,
    ) -> Self {
        let payments = match PaymentClient::from_config(&config.payments) {
            Ok(client) => client.map(Arc::new),
            Err(e) => {
                tracing::warn!(error = %e, "payment client unavailable");
                None
            }
        };

        let suggester = DomainSuggester::new(generator.clone());
        let domains = Arc::new(DomainChecker::new(&config.domains, suggester));

        Self {
            config: Arc::new(RwLock::new(config)),
            funnel: Arc::new(DiscoveryFunnel::new(generator.clone())),
            quotes: Arc::new(QuoteEstimator::new(generator)),
            domains,
            projects,
            payments,
            rest_client,
            env,
        }
    }

    /// Reload configuration from files.
    ///
    /// Collaborators keep their construction-time settings; only values read
    /// per-request (CORS is not among them) pick up changes.
    pub fn reload_config(&self) -> Result<(), String> {
        let new_config = load_settings(self.env.as_deref())
            .map_err(|e| format!("Failed to reload config: {}", e))?;

        let mut config = self.config.write();
        *config = new_config;

        tracing::info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }
}
