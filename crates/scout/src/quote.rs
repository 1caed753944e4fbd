//! Scout quote estimation
//!
//! The Scout estimator persona turns a project description into a price
//! quote. Pricing rules live in the system prompt - the backend itself does
//! not price anything. Like the funnel, the estimator is total: no
//! credential or a failed call produces a fixed default quote instead of an
//! error.

use std::sync::Arc;

use serde::Serialize;

use intake_core::{NewProject, Project, Quote};
use intake_llm::{parse_fenced_json, LlmError, TextGenerator};

const SCOUT_SYSTEM_PROMPT: &str = "\
Role: You are Scout, the Lead Estimator and Technical Architect for VectorWeb Labs, a \
high-performance student-run web agency.

Core Identity: Professional, energetic, \"hacker-chic\", and extremely concise.

Fundamental Rules:

1. Output Format (CRITICAL): You must ALWAYS return a raw JSON object. Do not wrap it \
in markdown ticks. No conversational filler.

2. Pricing Logic:
   - Base: $500
   - +$100 per page
   - Multipliers: 1.5x (E-commerce), 2.0x (Custom/Complex)
   - Student Discount: -20%

3. Risk Detection: Flag \"impossible\" requests (e.g., \"Facebook clone\", \"AI that \
writes itself\") in the risks field.

4. Response Schema (JSON Only):
{
    \"price\": number,
    \"reasoning\": string,
    \"features\": string[],
    \"risks\": string[],
    \"suggested_stack\": string
}";

/// Project description fed to the estimator.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteRequest {
    pub business_name: String,
    pub website_type: Option<String>,
    pub target_audience: Option<String>,
    pub vibe_style: String,
    pub project_scope: Option<serde_json::Value>,
}

impl From<&Project> for QuoteRequest {
    fn from(project: &Project) -> Self {
        Self {
            business_name: project.business_name.clone(),
            website_type: project.website_type.clone(),
            target_audience: project.target_audience.clone(),
            vibe_style: project.vibe_style.clone(),
            project_scope: project.project_scope.clone(),
        }
    }
}

impl From<&NewProject> for QuoteRequest {
    fn from(project: &NewProject) -> Self {
        Self {
            business_name: project.business_name.clone(),
            website_type: project.website_type.clone(),
            target_audience: project.target_audience.clone(),
            vibe_style: project.vibe_style.clone(),
            project_scope: project.project_scope.clone(),
        }
    }
}

/// AI-backed price quote estimator.
pub struct QuoteEstimator {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl QuoteEstimator {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    /// Estimate a quote. Never fails; degrades to a fixed default.
    pub async fn estimate(&self, request: &QuoteRequest) -> Quote {
        let Some(generator) = &self.generator else {
            return Self::mock_quote();
        };

        match self.generate(generator.as_ref(), request).await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!(error = %e, "quote generation failed, serving default estimate");
                Self::failure_quote()
            }
        }
    }

    async fn generate(
        &self,
        generator: &dyn TextGenerator,
        request: &QuoteRequest,
    ) -> Result<Quote, LlmError> {
        let user_prompt = build_user_prompt(request);
        let text = generator.complete(SCOUT_SYSTEM_PROMPT, &user_prompt).await?;
        parse_fenced_json(&text)
    }

    /// Quote served when no generation credential is configured.
    fn mock_quote() -> Quote {
        Quote {
            price: 1200.0,
            reasoning: "[MOCK] Estimated based on standard portfolio site with 5 pages."
                .to_string(),
            features: vec![
                "Responsive Design".to_string(),
                "Contact Form".to_string(),
                "SEO Optimization".to_string(),
            ],
            risks: vec![],
            suggested_stack: "Next.js + Tailwind CSS + Supabase".to_string(),
        }
    }

    /// Quote served when a live generation call fails.
    fn failure_quote() -> Quote {
        Quote {
            price: 1000.0,
            reasoning: "Unable to generate AI quote. Default estimate provided.".to_string(),
            features: vec!["Basic Website".to_string()],
            risks: vec!["AI quote generation failed".to_string()],
            suggested_stack: "Next.js + Tailwind CSS".to_string(),
        }
    }
}

fn build_user_prompt(request: &QuoteRequest) -> String {
    let scope = request
        .project_scope
        .as_ref()
        .and_then(|s| serde_json::to_string_pretty(s).ok())
        .unwrap_or_else(|| "Standard 5-page website".to_string());

    format!(
        "Generate a price quote for this project:\n\
         \n\
         Business Name: {}\n\
         Website Type: {}\n\
         Target Audience: {}\n\
         Design Style: {}\n\
         Scope: {}\n\
         \n\
         Return ONLY a valid JSON object with: price, reasoning, features, risks, \
         suggested_stack.",
        request.business_name,
        request.website_type.as_deref().unwrap_or("Portfolio"),
        request.target_audience.as_deref().unwrap_or("General"),
        request.vibe_style,
        scope,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> QuoteRequest {
        QuoteRequest {
            business_name: "Neon Sushi".to_string(),
            website_type: Some("E-commerce".to_string()),
            target_audience: None,
            vibe_style: "modern".to_string(),
            project_scope: None,
        }
    }

    #[tokio::test]
    async fn no_generator_serves_mock_quote() {
        let estimator = QuoteEstimator::new(None);
        let quote = estimator.estimate(&request()).await;
        assert_eq!(quote.price, 1200.0);
        assert!(quote.reasoning.starts_with("[MOCK]"));
    }

    #[test]
    fn user_prompt_defaults_missing_fields() {
        let prompt = build_user_prompt(&request());
        assert!(prompt.contains("Business Name: Neon Sushi"));
        assert!(prompt.contains("Website Type: E-commerce"));
        assert!(prompt.contains("Target Audience: General"));
        assert!(prompt.contains("Scope: Standard 5-page website"));
    }

    #[test]
    fn user_prompt_serializes_scope() {
        let mut req = request();
        req.project_scope = Some(serde_json::json!({"pages": 8}));
        let prompt = build_user_prompt(&req);
        assert!(prompt.contains(r#""pages": 8"#));
    }
}
