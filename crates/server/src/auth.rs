//! Bearer-token authentication
//!
//! Identity is delegated to the hosted provider: handlers consume only the
//! opaque authenticated user id. Without a provider configured (in-memory
//! development mode) a fixed development identity is substituted so the
//! wizard remains usable end to end.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header::AUTHORIZATION, StatusCode};

use crate::state::AppState;

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub email: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(verifier) = &state.rest_client else {
            tracing::debug!("no identity provider configured, using development identity");
            return Ok(AuthedUser {
                id: "dev-user".to_string(),
                email: None,
            });
        };

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        match verifier.verify_token(token).await {
            Ok(user) => Ok(AuthedUser {
                id: user.id,
                email: user.email,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "token verification failed");
                Err(StatusCode::UNAUTHORIZED)
            }
        }
    }
}
