//! Low-level client for the hosted datastore
//!
//! Speaks the PostgREST dialect: row filters as query parameters
//! (`id=eq.{uuid}`), `Prefer: return=representation` to get mutated rows
//! back, and the service-role key in both the `apikey` and `Authorization`
//! headers. The same host exposes the identity provider, so bearer-token
//! verification is a sibling call here.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use intake_config::PersistenceConfig;

use crate::PersistenceError;

/// Verified identity-provider user
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authenticated JSON client for one hosted datastore
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl RestClient {
    pub fn new(config: &PersistenceConfig) -> Result<Self, PersistenceError> {
        if config.rest_url.is_empty() || config.service_key.is_empty() {
            return Err(PersistenceError::Connection(
                "rest_url and service_key must be configured".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(&config.service_key)
            .map_err(|e| PersistenceError::Connection(format!("invalid service key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|e| PersistenceError::Connection(format!("invalid service key: {}", e)))?;
        headers.insert("apikey", key_value);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        Ok(Self {
            base_url: config.rest_url.trim_end_matches('/').to_string(),
            api_key: config.service_key.clone(),
            http,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Select rows matching the given filters.
    pub async fn select(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<Value>, PersistenceError> {
        let response = self
            .http
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(filters)
            .send()
            .await?;

        Self::rows(response).await
    }

    /// Insert a row and return the stored representation.
    pub async fn insert(&self, table: &str, body: &Value) -> Result<Vec<Value>, PersistenceError> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        Self::rows(response).await
    }

    /// Update rows matching the filters and return the stored rows.
    pub async fn update(
        &self,
        table: &str,
        filters: &[(&str, String)],
        body: &Value,
    ) -> Result<Vec<Value>, PersistenceError> {
        let response = self
            .http
            .patch(self.table_url(table))
            .query(filters)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        Self::rows(response).await
    }

    /// Cheap connectivity probe: one row from the projects table.
    pub async fn health_check(&self) -> Result<(), PersistenceError> {
        let response = self
            .http
            .get(self.table_url("projects"))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(PersistenceError::Connection(format!(
                "health check returned HTTP {}",
                response.status()
            )))
        }
    }

    /// Verify a client bearer token with the identity provider.
    pub async fn verify_token(&self, token: &str) -> Result<AuthUser, PersistenceError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(PersistenceError::Unauthorized);
        }
        if !status.is_success() {
            return Err(PersistenceError::Query(format!(
                "token verification returned HTTP {}",
                status
            )));
        }

        response
            .json::<AuthUser>()
            .await
            .map_err(|e| PersistenceError::Serialization(e.to_string()))
    }

    async fn rows(response: reqwest::Response) -> Result<Vec<Value>, PersistenceError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PersistenceError::Query(format!(
                "HTTP {}: {}",
                status, detail
            )));
        }

        let rows = response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PersistenceConfig {
        PersistenceConfig {
            enabled: true,
            rest_url: "https://example.supabase.co/".to_string(),
            service_key: "service-role-key".to_string(),
            timeout_secs: 10,
        }
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client = RestClient::new(&config()).unwrap();
        assert_eq!(
            client.table_url("projects"),
            "https://example.supabase.co/rest/v1/projects"
        );
    }

    #[test]
    fn missing_credentials_rejected() {
        let bad = PersistenceConfig {
            enabled: true,
            rest_url: String::new(),
            service_key: String::new(),
            timeout_secs: 10,
        };
        assert!(matches!(
            RestClient::new(&bad),
            Err(PersistenceError::Connection(_))
        ));
    }
}
