//! Generation backend implementations
//!
//! OpenRouter exposes an OpenAI-compatible chat-completions API; the backend
//! here sends one system message and one user message per call and returns
//! the first choice's content. A failed call is not retried: the callers own
//! the degradation policy (fixed fallback content), and retrying would trade
//! their bounded latency for a marginally better question.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use intake_config::GenerationConfig;

use crate::prompt::Message;
use crate::LlmError;

/// Stateless text completion
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a system instruction and a user message
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, LlmError>;

    /// Check whether the provider answers at all
    async fn is_available(&self) -> bool;

    /// Model name/ID
    fn model_name(&self) -> &str;
}

/// OpenRouter backend
///
/// Works with any OpenAI-compatible chat-completions endpoint; the
/// `HTTP-Referer` / `X-Title` headers are OpenRouter's attribution scheme
/// and are ignored by other providers.
pub struct OpenRouterBackend {
    config: GenerationConfig,
    client: Client,
}

impl OpenRouterBackend {
    /// Create a new backend.
    ///
    /// Fails with [`LlmError::Unavailable`] when no API key is configured;
    /// callers decide at construction time whether to run in live or canned
    /// mode.
    pub fn new(config: GenerationConfig) -> Result<Self, LlmError> {
        if config.api_key.is_none() {
            return Err(LlmError::Unavailable);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                LlmError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    fn build_headers(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::HeaderValue;

        let mut headers = reqwest::header::HeaderMap::new();

        let key = self.config.api_key.as_deref().unwrap_or_default();
        let auth_value = format!("Bearer {}", key);
        if let Ok(val) = HeaderValue::from_str(&auth_value) {
            headers.insert(reqwest::header::AUTHORIZATION, val);
        }

        if let Ok(val) = HeaderValue::from_str(&self.config.referer) {
            headers.insert("HTTP-Referer", val);
        }
        if let Ok(val) = HeaderValue::from_str(&self.config.app_title) {
            headers.insert("X-Title", val);
        }

        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        headers
    }
}

#[async_trait]
impl TextGenerator for OpenRouterBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message::system(system_prompt), Message::user(user_prompt)],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        let response = self
            .client
            .post(self.chat_url())
            .headers(self.build_headers())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        tracing::debug!(
            model = %self.config.model,
            response_chars = choice.message.content.len(),
            "completion received"
        );

        Ok(choice.message.content)
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.config.endpoint.trim_end_matches('/'));
        self.client
            .get(&url)
            .headers(self.build_headers())
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI-compatible API types
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> GenerationConfig {
        GenerationConfig {
            api_key: Some("sk-or-xxx".to_string()),
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn backend_requires_api_key() {
        let config = GenerationConfig {
            api_key: None,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            OpenRouterBackend::new(config),
            Err(LlmError::Unavailable)
        ));
    }

    #[test]
    fn backend_creation_with_key() {
        let backend = OpenRouterBackend::new(config_with_key()).unwrap();
        assert_eq!(
            backend.chat_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn headers_carry_attribution() {
        let backend = OpenRouterBackend::new(config_with_key()).unwrap();
        let headers = backend.build_headers();
        assert!(headers.contains_key("HTTP-Referer"));
        assert!(headers.contains_key("X-Title"));
        assert_eq!(
            headers.get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer sk-or-xxx"
        );
    }

    #[test]
    fn request_serialization() {
        let request = ChatRequest {
            model: "meta-llama/llama-3.3-70b-instruct:free".to_string(),
            messages: vec![Message::system("sys"), Message::user("hi")],
            max_tokens: Some(512),
            temperature: Some(0.7),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("llama-3.3-70b"));
        assert!(json.contains(r#""role":"system""#));
        assert!(json.contains("max_tokens"));
    }
}
