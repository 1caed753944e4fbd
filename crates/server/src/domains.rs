//! Domain availability checks
//!
//! Availability is probed over RDAP: a registered domain answers 200, an
//! unregistered one 404. Lookup failures degrade to "available" with a
//! warning rather than blocking the wizard - a wrong optimistic answer is
//! recoverable at registration time, a hard error stalls the flow.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;

use intake_config::DomainsConfig;
use intake_scout::DomainSuggester;

/// Availability check result
#[derive(Debug, Serialize)]
pub struct DomainCheck {
    pub available: bool,
    pub domain: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Domain availability checker
pub struct DomainChecker {
    rdap_endpoint: String,
    http: Client,
    suggester: DomainSuggester,
}

enum Lookup {
    Registered,
    Unregistered,
    Unknown(String),
}

impl DomainChecker {
    pub fn new(config: &DomainsConfig, suggester: DomainSuggester) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            rdap_endpoint: config.rdap_endpoint.trim_end_matches('/').to_string(),
            http,
            suggester,
        }
    }

    /// Check whether `domain` can be registered, suggesting alternatives
    /// when it cannot. Never fails.
    pub async fn check(&self, domain: &str, vibe: &str) -> DomainCheck {
        let domain = normalize(domain);

        match self.lookup(&domain).await {
            Lookup::Registered => {
                let suggestions = self.suggester.suggest(&domain, vibe).await;
                DomainCheck {
                    available: false,
                    domain,
                    suggestions,
                    warning: None,
                }
            }
            Lookup::Unregistered => DomainCheck {
                available: true,
                domain,
                suggestions: Vec::new(),
                warning: None,
            },
            Lookup::Unknown(reason) => {
                tracing::warn!(domain = %domain, reason = %reason, "availability lookup inconclusive");
                DomainCheck {
                    available: true,
                    domain,
                    suggestions: Vec::new(),
                    warning: Some(format!("Could not verify: {}", reason)),
                }
            }
        }
    }

    async fn lookup(&self, domain: &str) -> Lookup {
        let url = format!("{}/domain/{}", self.rdap_endpoint, domain);

        match self.http.get(&url).send().await {
            Ok(response) => match response.status() {
                StatusCode::NOT_FOUND => Lookup::Unregistered,
                status if status.is_success() => Lookup::Registered,
                status => Lookup::Unknown(format!("lookup returned HTTP {}", status)),
            },
            Err(e) => Lookup::Unknown(e.to_string()),
        }
    }
}

/// Default to `.com` when the requested name carries no TLD.
fn normalize(domain: &str) -> String {
    let domain = domain.trim().to_lowercase();
    if domain.contains('.') {
        domain
    } else {
        format!("{}.com", domain)
    }
}
