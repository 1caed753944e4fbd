//! Centralized constants for the intake backend
//!
//! Single source of truth for external endpoints and default tuning values
//! used across the crates.

/// External service endpoints
pub mod endpoints {
    /// OpenRouter OpenAI-compatible API base
    pub const OPENROUTER: &str = "https://openrouter.ai/api/v1";

    /// RDAP bootstrap redirector used for domain availability probes
    pub const RDAP: &str = "https://rdap.org";

    /// Payment processor API base
    pub const STRIPE: &str = "https://api.stripe.com/v1";
}

/// Generation defaults
pub mod generation {
    /// Default model routed through OpenRouter
    pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";

    /// Referer and title headers OpenRouter uses for attribution
    pub const DEFAULT_REFERER: &str = "http://localhost:3000";
    pub const DEFAULT_APP_TITLE: &str = "VectorWeb Labs";

    pub const DEFAULT_MAX_TOKENS: usize = 512;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

/// Payment defaults
pub mod payments {
    /// Share of the quoted price collected as the initial deposit
    pub const DEPOSIT_FRACTION: f64 = 0.5;
}
