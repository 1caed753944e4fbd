//! Payment processor integration
//!
//! Two halves: creating a hosted checkout session for the project deposit,
//! and verifying + dispatching the processor's asynchronous webhook. Only
//! the resulting state transition (deposit paid, project building) belongs
//! to this backend; card handling stays entirely with the processor.

use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;

use intake_config::PaymentsConfig;
use intake_core::Project;

use crate::ServerError;

type HmacSha256 = Hmac<Sha256>;

/// Client for the payment processor's REST API
pub struct PaymentClient {
    endpoint: String,
    secret_key: String,
    app_url: String,
    deposit_fraction: f64,
    http: Client,
}

impl PaymentClient {
    /// Build a client from configuration. `Ok(None)` when no secret key is
    /// configured - checkout creation is simply disabled.
    pub fn from_config(config: &PaymentsConfig) -> Result<Option<Self>, ServerError> {
        let Some(secret_key) = config.secret_key.clone() else {
            return Ok(None);
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ServerError::Init(format!("payment client: {}", e)))?;

        Ok(Some(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            secret_key,
            app_url: config.app_url.trim_end_matches('/').to_string(),
            deposit_fraction: config.deposit_fraction,
            http,
        }))
    }

    /// Create a checkout session for the project deposit and return the
    /// hosted checkout URL.
    pub async fn create_deposit_checkout(
        &self,
        project: &Project,
    ) -> Result<String, intake_core::Error> {
        let quoted = project.ai_price_quote.unwrap_or(0.0);
        // Quote may be missing or zero on drafts; charge a floor deposit
        // rather than a free checkout.
        let full_price = if quoted > 0.0 { quoted } else { 1000.0 };
        let deposit_cents = (full_price * self.deposit_fraction * 100.0).round() as i64;

        let percent = (self.deposit_fraction * 100.0).round() as i64;
        let product_name = format!("{}% Deposit - {}", percent, project.business_name);

        let form: Vec<(&str, String)> = vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            ("line_items[0][price_data][product_data][name]", product_name),
            (
                "line_items[0][price_data][product_data][description]",
                "Initial deposit to start development".to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                deposit_cents.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            (
                "success_url",
                format!("{}/dashboard?payment_success=true", self.app_url),
            ),
            (
                "cancel_url",
                format!("{}/dashboard?payment_cancelled=true", self.app_url),
            ),
            ("metadata[project_id]", project.id.to_string()),
            ("metadata[user_id]", project.user_id.clone()),
        ];

        let response = self
            .http
            .post(format!("{}/checkout/sessions", self.endpoint))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| intake_core::Error::Payment(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(intake_core::Error::Payment(format!(
                "HTTP {}: {}",
                status, detail
            )));
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| intake_core::Error::Payment(e.to_string()))?;

        session
            .url
            .ok_or_else(|| intake_core::Error::Payment("session has no URL".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    url: Option<String>,
}

/// Webhook event envelope
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// Project id carried in the checkout session metadata.
    pub fn project_id(&self) -> Option<Uuid> {
        self.data
            .object
            .get("metadata")?
            .get("project_id")?
            .as_str()?
            .parse()
            .ok()
    }
}

/// Verify a webhook signature header of the form `t=<ts>,v1=<hex>[,v1=...]`.
///
/// The signed payload is `{timestamp}.{raw body}`, HMAC-SHA256 under the
/// endpoint's signing secret. Any matching `v1` signature accepts the event;
/// comparison is constant-time via the MAC verifier.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str) -> bool {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let Some(timestamp) = timestamp else {
        return false;
    };
    if signatures.is_empty() {
        return false;
    }

    let mut signed = Vec::with_capacity(timestamp.len() + 1 + payload.len());
    signed.extend_from_slice(timestamp.as_bytes());
    signed.push(b'.');
    signed.extend_from_slice(payload);

    signatures.iter().any(|candidate| {
        let Some(bytes) = decode_hex(candidate) else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("infallible: HMAC accepts any key size");
        mac.update(&signed);
        mac.verify_slice(&bytes).is_ok()
    })
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(payload: &[u8], timestamp: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        let digest = mac.finalize().into_bytes();
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn valid_signature_accepted() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let sig = sign(payload, "1699999999", "whsec_test");
        let header = format!("t=1699999999,v1={}", sig);
        assert!(verify_signature(payload, &header, "whsec_test"));
    }

    #[test]
    fn wrong_secret_rejected() {
        let payload = b"{}";
        let sig = sign(payload, "1", "whsec_test");
        let header = format!("t=1,v1={}", sig);
        assert!(!verify_signature(payload, &header, "whsec_other"));
    }

    #[test]
    fn tampered_payload_rejected() {
        let sig = sign(b"original", "1", "whsec_test");
        let header = format!("t=1,v1={}", sig);
        assert!(!verify_signature(b"tampered", &header, "whsec_test"));
    }

    #[test]
    fn any_of_multiple_v1_signatures_accepts() {
        let payload = b"{}";
        let good = sign(payload, "1", "whsec_test");
        let header = format!("t=1,v1=deadbeef,v1={}", good);
        assert!(verify_signature(payload, &header, "whsec_test"));
    }

    #[test]
    fn missing_parts_rejected() {
        assert!(!verify_signature(b"{}", "v1=deadbeef", "s"));
        assert!(!verify_signature(b"{}", "t=1", "s"));
        assert!(!verify_signature(b"{}", "", "s"));
    }

    #[test]
    fn event_metadata_project_id() {
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "metadata": {
                        "project_id": "6f8a2f64-51e9-4f21-9c90-0c6b9f4f8f11",
                        "user_id": "user-1"
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(
            event.project_id().unwrap().to_string(),
            "6f8a2f64-51e9-4f21-9c90-0c6b9f4f8f11"
        );
    }

    #[test]
    fn event_without_metadata_has_no_project() {
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "checkout.session.completed",
            "data": { "object": {} }
        }))
        .unwrap();
        assert!(event.project_id().is_none());
    }
}
