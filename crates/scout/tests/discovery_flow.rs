//! Integration tests for the discovery funnel
//!
//! Exercises the engine against scripted and failing generators: the
//! termination rule, phase sequencing, topic deduplication, fallback
//! totality and the canned sequence.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use intake_core::{AnsweredStep, QuestionStep};
use intake_llm::{LlmError, TextGenerator};
use intake_scout::discovery::{canned, prompt, topic};
use intake_scout::{DiscoveryFunnel, Phase, TOTAL_STEPS};

/// Generator that replies with a fixed script and records every system
/// prompt it is asked with.
struct ScriptedGenerator {
    response: String,
    system_prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            system_prompts: Mutex::new(Vec::new()),
        }
    }

    fn recorded_prompts(&self) -> Vec<String> {
        self.system_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(
        &self,
        system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, LlmError> {
        self.system_prompts
            .lock()
            .unwrap()
            .push(system_prompt.to_string());
        Ok(self.response.clone())
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Generator that fails every call.
struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, LlmError> {
        Err(LlmError::Network("connection reset".to_string()))
    }

    async fn is_available(&self) -> bool {
        false
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

fn valid_response_json() -> String {
    r#"{"question":"Simulated question","options":["Option A","Option B"],"allow_multiple":false,"is_complete":false}"#
        .to_string()
}

// --- Termination ---------------------------------------------------------

#[tokio::test]
async fn index_at_or_past_ten_is_terminal_regardless_of_credential() {
    let history = vec![AnsweredStep::new("What are your goals?", "Sell online")];

    for funnel in [
        DiscoveryFunnel::canned(),
        DiscoveryFunnel::new(Some(Arc::new(ScriptedGenerator::new(valid_response_json())))),
        DiscoveryFunnel::new(Some(Arc::new(FailingGenerator))),
    ] {
        for index in [10, 11, 42] {
            let step = funnel.next_question("Neon Sushi", "Restaurant", index, &history).await;
            assert_eq!(step.question, "");
            assert!(step.options.is_empty());
            assert!(!step.allow_multiple);
            assert!(step.is_complete);
        }
    }
}

// --- Phase purity --------------------------------------------------------

#[tokio::test]
async fn phase_in_prompt_depends_only_on_index() {
    let generator = Arc::new(ScriptedGenerator::new(valid_response_json()));
    let funnel = DiscoveryFunnel::new(Some(generator.clone()));

    let histories: Vec<Vec<AnsweredStep>> = vec![
        vec![],
        vec![AnsweredStep::new("What is your budget?", "Around $2,000")],
    ];

    for index in 0..TOTAL_STEPS {
        let expected = format!("PHASE {}", Phase::for_index(index).number());
        for history in &histories {
            funnel.next_question("A", "B", index, history).await;
            let last = generator.recorded_prompts().pop().unwrap();
            assert!(
                last.contains(&expected),
                "index {} should carry {}, prompt was: {}",
                index,
                expected,
                last
            );
        }
    }
}

// --- Topic deduplication -------------------------------------------------

#[tokio::test]
async fn budget_in_history_is_forbidden_in_next_prompt() {
    let generator = Arc::new(ScriptedGenerator::new(valid_response_json()));
    let funnel = DiscoveryFunnel::new(Some(generator.clone()));

    let history = vec![AnsweredStep::new(
        "What BUDGET range feels comfortable?",
        "$1,000 to $3,000",
    )];
    funnel.next_question("Neon Sushi", "Restaurant", 5, &history).await;

    let prompt = generator.recorded_prompts().pop().unwrap();
    assert!(prompt.contains("FORBIDDEN"));
    assert!(prompt.contains("budget"));
}

#[tokio::test]
async fn clean_history_has_no_forbidden_directive() {
    let generator = Arc::new(ScriptedGenerator::new(valid_response_json()));
    let funnel = DiscoveryFunnel::new(Some(generator.clone()));

    funnel.next_question("Neon Sushi", "Restaurant", 0, &[]).await;

    let prompt = generator.recorded_prompts().pop().unwrap();
    assert!(!prompt.contains("FORBIDDEN"));
}

// --- Fallback totality ---------------------------------------------------

#[tokio::test]
async fn failing_generator_never_escapes_as_error() {
    let funnel = DiscoveryFunnel::new(Some(Arc::new(FailingGenerator)));

    for index in 0..=TOTAL_STEPS {
        let step = funnel.next_question("X", "Y", index, &[]).await;
        if index >= TOTAL_STEPS {
            assert!(step.is_complete);
        } else {
            assert_eq!(step, canned::fallback_step());
        }
    }
}

#[tokio::test]
async fn step_three_with_failing_generator_serves_fixed_fallback() {
    let funnel = DiscoveryFunnel::new(Some(Arc::new(FailingGenerator)));
    let step = funnel.next_question("Neon Sushi", "Restaurant", 3, &[]).await;

    assert_eq!(step.question, "What is your estimated timeline for launch?");
    assert_eq!(step.options.len(), 4);
    assert!(!step.allow_multiple);
    assert!(!step.is_complete);
}

#[tokio::test]
async fn malformed_response_serves_fallback() {
    for bad in [
        "Sure! Here is a question for you.",
        r#"{"options": ["A"]}"#,
        r#"{"question": ""}"#,
    ] {
        let funnel = DiscoveryFunnel::new(Some(Arc::new(ScriptedGenerator::new(bad))));
        let step = funnel.next_question("X", "Y", 1, &[]).await;
        assert_eq!(step, canned::fallback_step(), "input: {}", bad);
    }
}

// --- Canned-sequence determinism -----------------------------------------

#[tokio::test]
async fn canned_sequence_is_deterministic_and_ordered() {
    let funnel = DiscoveryFunnel::canned();

    for i in 0..TOTAL_STEPS {
        let first = funnel.next_question("X", "Y", i, &[]).await;
        let second = funnel.next_question("X", "Y", i, &[]).await;
        assert_eq!(first, second);
        assert_eq!(Some(first), canned::canned_step(i));
    }

    let past_end = funnel.next_question("X", "Y", TOTAL_STEPS, &[]).await;
    assert_eq!(past_end, QuestionStep::terminal());
}

#[tokio::test]
async fn canned_step_zero_scenario() {
    let funnel = DiscoveryFunnel::canned();
    let step = funnel.next_question("X", "Y", 0, &[]).await;

    assert_eq!(step.question, "What are the main goals of your new website?");
    assert_eq!(
        step.options,
        vec![
            "Get more local customers",
            "Sell products online",
            "Showcase portfolio",
            "Book appointments",
        ]
    );
    assert!(step.allow_multiple);
    assert!(!step.is_complete);
}

// --- Live-mode behavior --------------------------------------------------

#[tokio::test]
async fn fenced_response_is_accepted() {
    let fenced = format!("```json\n{}\n```", valid_response_json());
    let funnel = DiscoveryFunnel::new(Some(Arc::new(ScriptedGenerator::new(fenced))));

    let step = funnel.next_question("Neon Sushi", "Restaurant", 0, &[]).await;
    assert_eq!(step.question, "Simulated question");
    assert_eq!(step.options, vec!["Option A", "Option B"]);
}

#[tokio::test]
async fn generator_may_complete_early() {
    let response =
        r#"{"question":"","options":[],"allow_multiple":false,"is_complete":true}"#;
    let funnel = DiscoveryFunnel::new(Some(Arc::new(ScriptedGenerator::new(response))));

    let step = funnel.next_question("Neon Sushi", "Restaurant", 6, &[]).await;
    assert_eq!(step, QuestionStep::terminal());
}

#[tokio::test]
async fn full_funnel_simulation_accumulates_history() {
    // Mirrors a frontend driving the funnel: answer the first option of
    // every question and replay the history on each call.
    let generator = Arc::new(ScriptedGenerator::new(valid_response_json()));
    let funnel = DiscoveryFunnel::new(Some(generator.clone()));

    let mut history: Vec<AnsweredStep> = Vec::new();
    for index in 0..=TOTAL_STEPS {
        let step = funnel
            .next_question("Neon Sushi", "Restaurant", index, &history)
            .await;
        if step.is_complete {
            assert_eq!(index, TOTAL_STEPS);
            break;
        }
        let answer = step.options.first().cloned().unwrap_or_else(|| "ok".to_string());
        history.push(AnsweredStep::new(step.question, answer));
    }

    assert_eq!(history.len(), TOTAL_STEPS);
    assert_eq!(generator.recorded_prompts().len(), TOTAL_STEPS);
}

// --- Prompt assembly details ---------------------------------------------

#[test]
fn forbidden_directive_lists_every_covered_topic() {
    let history = vec![
        AnsweredStep::new("What are your goals and who is your audience?", "x"),
        AnsweredStep::new("What is your budget?", "y"),
    ];
    let covered = topic::covered_topics(&history);
    let system = prompt::build_system_prompt(Phase::for_index(7), &covered);

    for keyword in ["goals", "audience", "budget"] {
        assert!(
            system.contains(keyword),
            "missing {} in: {}",
            keyword,
            system
        );
    }
}
