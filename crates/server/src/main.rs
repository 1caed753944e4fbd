//! Intake backend entry point

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use intake_config::{load_settings, Settings};
use intake_llm::{LlmError, OpenRouterBackend, TextGenerator};
use intake_persistence::{
    InMemoryProjectStore, ProjectStore, RestClient, RestProjectStore,
};
use intake_server::{create_router, init_metrics, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("INTAKE_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!(
                "Loaded configuration from files (env: {})",
                env.as_deref().unwrap_or("default")
            );
            settings
        }
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&config);

    tracing::info!("Starting intake backend v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let _metrics_handle = init_metrics();
    tracing::info!("Initialized Prometheus metrics at /metrics");

    // Generation collaborator: absent credential switches the funnel and
    // the quote estimator to their fixed canned content.
    let generator: Option<Arc<dyn TextGenerator>> =
        match OpenRouterBackend::new(config.generation.clone()) {
            Ok(backend) => {
                tracing::info!(model = backend.model_name(), "Generation backend configured");
                Some(Arc::new(backend))
            }
            Err(LlmError::Unavailable) => {
                tracing::warn!(
                    "No generation credential configured - discovery funnel and quotes \
                     will serve canned content"
                );
                None
            }
            Err(e) => return Err(Box::new(e) as Box<dyn std::error::Error>),
        };

    // Record store: hosted when configured and reachable, in-memory otherwise.
    let (projects, rest_client): (Arc<dyn ProjectStore>, Option<Arc<RestClient>>) =
        if config.persistence.enabled {
            match init_record_store(&config).await {
                Ok((store, client)) => {
                    tracing::info!(
                        rest_url = %config.persistence.rest_url,
                        "Hosted record store initialized"
                    );
                    (store, Some(client))
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to initialize hosted record store: {}. Falling back to in-memory.",
                        e
                    );
                    (Arc::new(InMemoryProjectStore::new()), None)
                }
            }
        } else {
            tracing::info!("Persistence disabled, using in-memory record store");
            (Arc::new(InMemoryProjectStore::new()), None)
        };

    let port = config.server.port;
    let state = AppState::with_parts(config, generator, projects, rest_client, env);

    tracing::info!(
        live_generation = state.funnel.is_live(),
        hosted_store = state.projects.is_hosted(),
        payments = state.payments.is_some(),
        "Initialized application state"
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

/// Initialize tracing (env-filter, optional JSON output)
fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("intake={},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}

/// Connect to the hosted record store and verify it answers
async fn init_record_store(
    config: &Settings,
) -> Result<(Arc<dyn ProjectStore>, Arc<RestClient>), intake_persistence::PersistenceError> {
    let client = RestClient::new(&config.persistence)?;
    let store = RestProjectStore::new(client.clone());
    store.health_check().await?;

    Ok((Arc::new(store), Arc::new(client)))
}
