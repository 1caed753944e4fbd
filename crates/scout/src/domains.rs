//! Alternative domain-name suggestions
//!
//! When a requested domain is taken, the suggester asks the generator for
//! creative alternatives. No generator, or a failed call, falls back to a
//! fixed set of mechanical variations on the requested name.

use std::sync::Arc;

use intake_llm::{parse_fenced_json, LlmError, TextGenerator};

const SUGGEST_SYSTEM_PROMPT: &str =
    "You are a domain name expert. Return ONLY valid JSON arrays with no markdown formatting.";

/// Cap on suggestions returned to the client.
const MAX_SUGGESTIONS: usize = 5;

pub struct DomainSuggester {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl DomainSuggester {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    /// Suggest alternatives for a taken domain. Never fails.
    pub async fn suggest(&self, domain: &str, vibe: &str) -> Vec<String> {
        let Some(generator) = &self.generator else {
            return heuristic_suggestions(domain);
        };

        match self.generate(generator.as_ref(), domain, vibe).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!(domain, error = %e, "domain suggestion generation failed");
                heuristic_suggestions(domain)
            }
        }
    }

    async fn generate(
        &self,
        generator: &dyn TextGenerator,
        domain: &str,
        vibe: &str,
    ) -> Result<Vec<String>, LlmError> {
        let user_prompt = format!(
            "The domain '{}' is taken. The brand vibe is '{}'.\n\
             Suggest 3 available, creative alternatives (e.g., with .io, .co, .lab, .dev, .app).\n\
             Return ONLY a JSON list of strings, no other text.",
            domain, vibe,
        );

        let text = generator.complete(SUGGEST_SYSTEM_PROMPT, &user_prompt).await?;
        let mut suggestions: Vec<String> = parse_fenced_json(&text)?;
        suggestions.truncate(MAX_SUGGESTIONS);
        Ok(suggestions)
    }
}

/// Mechanical fallback variations on a taken name.
fn heuristic_suggestions(domain: &str) -> Vec<String> {
    let base = domain
        .trim_end_matches(".com")
        .trim_end_matches(".io")
        .trim_end_matches(".co");

    vec![
        format!("{}.io", base),
        format!("{}lab.co", base),
        format!("get{}.com", base),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_generator_serves_heuristics() {
        let suggester = DomainSuggester::new(None);
        let suggestions = suggester.suggest("coolbrand.com", "modern").await;
        assert_eq!(
            suggestions,
            vec!["coolbrand.io", "coolbrandlab.co", "getcoolbrand.com"]
        );
    }

    #[test]
    fn heuristics_strip_known_tlds() {
        assert_eq!(
            heuristic_suggestions("shop.io"),
            vec!["shop.io", "shoplab.co", "getshop.com"]
        );
    }
}
