//! Adaptive discovery funnel ("Dungeon Master")
//!
//! One call per step: the caller passes the business identity, the step
//! index and the full ordered history of answered questions, and gets back
//! the next [`QuestionStep`]. The engine keeps no state between calls - all
//! session state is caller-supplied and caller-persisted.
//!
//! The engine is total. Every failure path resolves to a valid question:
//! a missing credential serves the fixed canned sequence, a failed or
//! malformed generation serves the fixed fallback question, and an index at
//! or past the step budget serves the terminal marker. Nothing here returns
//! an error or panics.

pub mod canned;
pub mod phase;
pub mod prompt;
pub mod topic;

use std::sync::Arc;

use serde::Deserialize;

use intake_core::{AnsweredStep, QuestionStep};
use intake_llm::{parse_fenced_json, LlmError, TextGenerator};

use self::phase::Phase;

/// Fixed step budget: indices 0-9 ask questions, index 10 is terminal.
pub const TOTAL_STEPS: usize = 10;

/// Structured shape expected from the generator.
///
/// `is_complete` defaults to false when absent; camelCase field names are
/// tolerated since models drift between conventions.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default, alias = "allowMultiple")]
    allow_multiple: bool,
    #[serde(default, alias = "isComplete")]
    is_complete: bool,
}

/// The discovery funnel engine.
pub struct DiscoveryFunnel {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl DiscoveryFunnel {
    /// Engine with an optional generation collaborator. `None` runs the
    /// fixed canned sequence.
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    /// Engine in canned-sequence mode.
    pub fn canned() -> Self {
        Self { generator: None }
    }

    /// Whether a generation collaborator is wired in.
    pub fn is_live(&self) -> bool {
        self.generator.is_some()
    }

    /// Produce the next question for a funnel session.
    ///
    /// `history` must be the complete ordered list of answered steps from
    /// prior calls, unmodified.
    pub async fn next_question(
        &self,
        business_name: &str,
        industry: &str,
        index: usize,
        history: &[AnsweredStep],
    ) -> QuestionStep {
        if index >= TOTAL_STEPS {
            return QuestionStep::terminal();
        }

        let Some(generator) = &self.generator else {
            return canned::canned_step(index).unwrap_or_else(QuestionStep::terminal);
        };

        let phase = Phase::for_index(index);
        let covered = topic::covered_topics(history);
        let system = prompt::build_system_prompt(phase, &covered);
        let user = prompt::build_user_prompt(business_name, industry, index, history);

        tracing::debug!(
            index,
            phase = phase.display_name(),
            covered = covered.len(),
            "generating discovery question"
        );

        match generate_step(generator.as_ref(), &system, &user).await {
            Ok(step) => {
                if step.is_complete {
                    tracing::info!(index, "generator declared discovery complete early");
                }
                step
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "generation failed, serving fallback question");
                canned::fallback_step()
            }
        }
    }
}

/// One generation round-trip plus shape validation. No retries: a failed
/// call degrades immediately so the step stays within one bounded timeout.
async fn generate_step(
    generator: &dyn TextGenerator,
    system: &str,
    user: &str,
) -> Result<QuestionStep, LlmError> {
    let text = generator.complete(system, user).await?;
    let raw: RawQuestion = parse_fenced_json(&text)?;

    if raw.is_complete && raw.question.trim().is_empty() {
        return Ok(QuestionStep::terminal());
    }
    if raw.question.trim().is_empty() {
        return Err(LlmError::InvalidResponse(
            "generator returned an empty question".to_string(),
        ));
    }

    Ok(QuestionStep {
        question: raw.question,
        options: raw.options,
        allow_multiple: raw.allow_multiple,
        is_complete: raw.is_complete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn canned_mode_serves_the_fixed_sequence() {
        let funnel = DiscoveryFunnel::canned();
        for i in 0..TOTAL_STEPS {
            let step = funnel.next_question("X", "Y", i, &[]).await;
            assert_eq!(Some(step), canned::canned_step(i));
        }
    }

    #[tokio::test]
    async fn index_past_budget_is_terminal_in_canned_mode() {
        let funnel = DiscoveryFunnel::canned();
        for i in [TOTAL_STEPS, TOTAL_STEPS + 1, 99] {
            let step = funnel.next_question("X", "Y", i, &[]).await;
            assert_eq!(step, QuestionStep::terminal());
        }
    }

    #[test]
    fn raw_question_accepts_camel_case_aliases() {
        let raw: RawQuestion = serde_json::from_str(
            r#"{"question":"Q","options":["A"],"allowMultiple":true,"isComplete":true}"#,
        )
        .unwrap();
        assert!(raw.allow_multiple);
        assert!(raw.is_complete);
    }

    #[test]
    fn raw_question_defaults_is_complete_false() {
        let raw: RawQuestion =
            serde_json::from_str(r#"{"question":"Q","options":[],"allow_multiple":false}"#)
                .unwrap();
        assert!(!raw.is_complete);
    }
}
