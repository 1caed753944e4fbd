//! HTTP Endpoints
//!
//! REST API for the intake wizard. `/api/discovery/next` and
//! `/api/check-domain` are intentionally open - discovery happens before an
//! account exists. Project routes require the authenticated owner.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Json, Path, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use intake_core::{
    AnsweredStep, NewProject, Project, ProjectPatch, ProjectStatus, QuestionStep, Quote,
};
use intake_persistence::PersistenceError;
use intake_scout::QuoteRequest;

use crate::auth::AuthedUser;
use crate::domains::DomainCheck;
use crate::metrics::metrics_handler;
use crate::payments::{verify_signature, WebhookEvent};
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    drop(config);

    Router::new()
        // Discovery funnel (open)
        .route("/api/discovery/next", post(discovery_next))
        // Projects
        .route("/api/projects", post(create_project).get(list_projects))
        .route("/api/projects/draft", post(create_project_draft))
        .route("/api/projects/:id", get(get_project).patch(update_project))
        .route("/api/projects/:id/quote", post(generate_project_quote))
        .route("/api/projects/:id/finalize", post(finalize_project))
        .route("/api/projects/:id/pay", post(pay_project))
        // Domains (open)
        .route("/api/check-domain", post(check_domain))
        // Payments
        .route("/api/create-checkout-session", post(create_checkout_session))
        .route("/api/webhooks/stripe", post(payment_webhook))
        // Health
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        // Admin
        .route("/admin/reload-config", post(reload_config))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000 for safety
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    // Credentials rule out wildcard headers; name the ones the wizard sends.
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Map store failures onto response codes
fn store_error(e: PersistenceError) -> StatusCode {
    match e {
        PersistenceError::NotFound(_) => StatusCode::NOT_FOUND,
        other => {
            tracing::error!(error = %other, "record store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Fetch a project and enforce ownership
async fn load_owned(
    state: &AppState,
    id: Uuid,
    user: &AuthedUser,
) -> Result<Project, StatusCode> {
    let project = state
        .projects
        .get(id)
        .await
        .map_err(store_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    if project.user_id != user.id {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(project)
}

// --- Discovery -----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DiscoveryNextRequest {
    business_name: String,
    industry: String,
    #[serde(default)]
    current_q_index: usize,
    #[serde(default)]
    previous_answers: Vec<AnsweredStep>,
}

/// Generate the next discovery question for the scoping wizard
async fn discovery_next(
    State(state): State<AppState>,
    Json(request): Json<DiscoveryNextRequest>,
) -> Json<QuestionStep> {
    metrics::counter!("discovery_requests_total").increment(1);

    let step = state
        .funnel
        .next_question(
            &request.business_name,
            &request.industry,
            request.current_q_index,
            &request.previous_answers,
        )
        .await;

    if step.is_complete {
        metrics::counter!("discovery_completions_total").increment(1);
    }

    Json(step)
}

// --- Projects ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreateProjectRequest {
    business_name: String,
    vibe_style: String,
    domain_choice: String,
    #[serde(default)]
    client_phone: Option<String>,
    #[serde(default)]
    website_type: Option<String>,
    #[serde(default)]
    target_audience: Option<String>,
    #[serde(default)]
    project_scope: Option<serde_json::Value>,
    #[serde(default)]
    wizard_data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct CreateProjectResponse {
    project_id: Uuid,
    status: ProjectStatus,
    quote: Quote,
}

/// Create a project and generate its quote immediately
async fn create_project(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<CreateProjectRequest>,
) -> Result<Json<CreateProjectResponse>, StatusCode> {
    let new_project = NewProject {
        business_name: request.business_name,
        vibe_style: request.vibe_style,
        domain_choice: request.domain_choice,
        user_id: user.id,
        client_phone: request.client_phone,
        website_type: request.website_type,
        target_audience: request.target_audience,
        project_scope: request.project_scope,
        wizard_step: None,
        wizard_data: request.wizard_data,
    };

    let created = state.projects.create(new_project).await.map_err(store_error)?;

    let quote = state.quotes.estimate(&QuoteRequest::from(&created)).await;
    let updated = state
        .projects
        .update(created.id, ProjectPatch::from_quote(&quote))
        .await
        .map_err(store_error)?;

    Ok(Json(CreateProjectResponse {
        project_id: updated.id,
        status: updated.status,
        quote,
    }))
}

/// Create an empty draft project for the wizard
async fn create_project_draft(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let draft = NewProject {
        business_name: "Untitled Project".to_string(),
        vibe_style: "modern".to_string(),
        domain_choice: String::new(),
        user_id: user.id,
        client_phone: None,
        website_type: None,
        target_audience: None,
        project_scope: None,
        wizard_step: Some(1),
        wizard_data: Some(serde_json::json!({})),
    };

    let created = state.projects.create(draft).await.map_err(store_error)?;
    Ok(Json(serde_json::json!({ "project_id": created.id })))
}

/// Fetch a single project
async fn get_project(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, StatusCode> {
    let project = load_owned(&state, id, &user).await?;
    Ok(Json(project))
}

#[derive(Debug, Default, Deserialize)]
struct UpdateProjectRequest {
    business_name: Option<String>,
    vibe_style: Option<String>,
    domain_choice: Option<String>,
    wizard_step: Option<u32>,
    wizard_data: Option<serde_json::Value>,
    project_scope: Option<serde_json::Value>,
}

/// Update a project incrementally
async fn update_project(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, StatusCode> {
    let project = load_owned(&state, id, &user).await?;

    let patch = ProjectPatch {
        business_name: request.business_name,
        vibe_style: request.vibe_style,
        domain_choice: request.domain_choice,
        wizard_step: request.wizard_step,
        wizard_data: request.wizard_data,
        project_scope: request.project_scope,
        ..ProjectPatch::default()
    };

    if patch.is_empty() {
        return Ok(Json(project));
    }

    let updated = state
        .projects
        .update(id, patch)
        .await
        .map_err(store_error)?;
    Ok(Json(updated))
}

/// Generate a fresh quote for an existing project
async fn generate_project_quote(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, StatusCode> {
    let project = load_owned(&state, id, &user).await?;
    let updated = quote_and_store(&state, &project, ProjectStatus::Quoted).await?;
    Ok(Json(updated))
}

/// Finalize the wizard: quote the project and mark the proposal ready
async fn finalize_project(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, StatusCode> {
    let project = load_owned(&state, id, &user).await?;
    let updated = quote_and_store(&state, &project, ProjectStatus::ProposalReady).await?;
    Ok(Json(updated))
}

async fn quote_and_store(
    state: &AppState,
    project: &Project,
    status: ProjectStatus,
) -> Result<Project, StatusCode> {
    let quote = state.quotes.estimate(&QuoteRequest::from(project)).await;

    let mut patch = ProjectPatch::from_quote(&quote);
    patch.status = Some(status);

    state
        .projects
        .update(project.id, patch)
        .await
        .map_err(store_error)
}

/// Direct deposit-paid transition (development path, no processor involved)
async fn pay_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state
        .projects
        .mark_deposit_paid(id)
        .await
        .map_err(store_error)?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Payment processed"
    })))
}

/// Fetch all projects for the authenticated user
async fn list_projects(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<Json<Vec<Project>>, StatusCode> {
    let projects = state
        .projects
        .list_by_owner(&user.id)
        .await
        .map_err(store_error)?;
    Ok(Json(projects))
}

// --- Domains -------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DomainCheckRequest {
    domain: String,
    #[serde(default = "default_vibe")]
    vibe: String,
}

fn default_vibe() -> String {
    "modern".to_string()
}

/// Check availability of a domain
async fn check_domain(
    State(state): State<AppState>,
    Json(request): Json<DomainCheckRequest>,
) -> Json<DomainCheck> {
    Json(state.domains.check(&request.domain, &request.vibe).await)
}

// --- Payments ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreateCheckoutRequest {
    project_id: Uuid,
}

/// Create a checkout session for the project deposit
async fn create_checkout_session(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let payments = state
        .payments
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let project = load_owned(&state, request.project_id, &user).await?;

    match payments.create_deposit_checkout(&project).await {
        Ok(url) => Ok(Json(serde_json::json!({ "checkout_url": url }))),
        Err(e) => {
            tracing::error!(project_id = %project.id, error = %e, "checkout session creation failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle payment processor webhooks
async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let secret = state.get_config().payments.webhook_secret.clone();
    let Some(secret) = secret else {
        tracing::error!("webhook received but no signing secret is configured");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;

    if !verify_signature(&body, signature, &secret) {
        tracing::warn!("webhook signature verification failed");
        return Err(StatusCode::BAD_REQUEST);
    }

    let event: WebhookEvent =
        serde_json::from_slice(&body).map_err(|_| StatusCode::BAD_REQUEST)?;

    if event.event_type == "checkout.session.completed" {
        if let Some(project_id) = event.project_id() {
            match state.projects.mark_deposit_paid(project_id).await {
                Ok(_) => {
                    metrics::counter!("deposits_paid_total").increment(1);
                    tracing::info!(%project_id, "deposit payment recorded");
                }
                Err(e) => {
                    tracing::error!(%project_id, error = %e, "failed to record deposit");
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        } else {
            tracing::warn!("checkout completed without a project_id in metadata");
        }
    }

    Ok(Json(serde_json::json!({ "status": "success" })))
}

// --- Health --------------------------------------------------------------

/// Liveness check with record-store connectivity
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (database, healthy) = match &state.rest_client {
        Some(client) => match client.health_check().await {
            Ok(()) => (serde_json::json!({ "status": "connected" }), true),
            Err(e) => (
                serde_json::json!({ "status": "disconnected", "error": e.to_string() }),
                false,
            ),
        },
        None => (serde_json::json!({ "status": "in_memory" }), true),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if healthy { "online" } else { "degraded" },
            "system": "VectorWeb Labs API",
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
        })),
    )
}

/// Readiness check with generation backend connectivity
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let endpoint = state.get_config().generation.endpoint.clone();

    let mut checks = serde_json::Map::new();
    let mut ready = true;

    if state.funnel.is_live() {
        let url = format!("{}/models", endpoint.trim_end_matches('/'));
        let status = match tokio::time::timeout(Duration::from_secs(2), reqwest::get(&url)).await
        {
            Ok(Ok(resp)) if resp.status().is_success() => "ok",
            Ok(Ok(_)) => {
                ready = false;
                "error"
            }
            Ok(Err(_)) => {
                ready = false;
                "unreachable"
            }
            Err(_) => {
                ready = false;
                "timeout"
            }
        };

        checks.insert(
            "generation".to_string(),
            serde_json::json!({ "status": status, "url": url }),
        );
    } else {
        checks.insert(
            "generation".to_string(),
            serde_json::json!({ "status": "canned_mode" }),
        );
    }

    checks.insert(
        "record_store".to_string(),
        serde_json::json!({
            "status": if state.projects.is_hosted() { "hosted" } else { "in_memory" }
        }),
    );

    checks.insert(
        "payments".to_string(),
        serde_json::json!({
            "status": if state.payments.is_some() { "configured" } else { "disabled" }
        }),
    );

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "checks": checks,
        })),
    )
}

/// Reload configuration from disk
async fn reload_config(State(state): State<AppState>) -> impl IntoResponse {
    match state.reload_config() {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "message": "Configuration reloaded successfully"
            })),
        ),
        Err(e) => {
            tracing::error!("Config reload failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "error",
                    "message": e
                })),
            )
        }
    }
}
