//! Prompt assembly for the discovery funnel
//!
//! The system prompt carries the phase focus, the consultant persona, the
//! multi-select rule and the forbidden-topics directive. The user prompt
//! carries the client identity, the step position and the full answered
//! history. History is rendered one exchange per line, so free text from the
//! client is flattened before embedding - a newline in a business name must
//! not fabricate an extra history record.

use intake_core::AnsweredStep;

use super::phase::Phase;
use super::topic::Topic;
use super::TOTAL_STEPS;

/// Flatten free text for safe embedding in a line-oriented prompt.
fn sanitize(text: &str) -> String {
    text.replace(['\n', '\r'], " ").trim().to_string()
}

/// Build the system instruction for one funnel step.
pub fn build_system_prompt(phase: Phase, covered: &[Topic]) -> String {
    let mut prompt = format!(
        "Role: You are the Dungeon Master for the scoping phase at VectorWeb Labs, a small \
         web agency. You run an adaptive discovery questionnaire as a friendly, \
         non-technical small-business consultant.\n\
         \n\
         PHASE {number} ({name}): {focus}\n\
         \n\
         Tone rules:\n\
         - Never use jargon terms such as stack, backend, database, or auth.\n\
         - One short, concrete question at a time, with 3-5 selectable answer options.\n\
         \n\
         Multi-select rule:\n\
         - Questions about goals, features, pain points, services, or requirements MUST \
         set \"allow_multiple\": true.\n\
         - Questions about budget or timeline MUST set \"allow_multiple\": false.\n",
        number = phase.number(),
        name = phase.display_name(),
        focus = phase.focus(),
    );

    if !covered.is_empty() {
        let forbidden: Vec<&str> = covered.iter().map(Topic::keyword).collect();
        prompt.push_str(&format!(
            "\nAlready covered topics - FORBIDDEN, do not ask about these again: {}.\n",
            forbidden.join(", ")
        ));
    }

    prompt.push_str(
        "\nIf you judge that enough information has been gathered to scope the project, \
         set \"is_complete\": true instead of asking another question.\n\
         \n\
         Output format (CRITICAL): return a raw JSON object only. No markdown fences, no \
         commentary. Schema:\n\
         {\"question\": string, \"options\": string[], \"allow_multiple\": boolean, \
         \"is_complete\": boolean}",
    );

    prompt
}

/// Build the user message for one funnel step.
pub fn build_user_prompt(
    business_name: &str,
    industry: &str,
    index: usize,
    history: &[AnsweredStep],
) -> String {
    let mut prompt = format!(
        "Client business: {}\nIndustry/Vibe: {}\nThis is question {} of {}.\n",
        sanitize(business_name),
        sanitize(industry),
        index + 1,
        TOTAL_STEPS,
    );

    if history.is_empty() {
        prompt.push_str("\nNo questions have been answered yet.\n");
    } else {
        prompt.push_str("\nAnswered so far, in order:\n");
        for (i, step) in history.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. Q: {} | A: {}\n",
                i + 1,
                sanitize(&step.question),
                sanitize(&step.answer),
            ));
        }
    }

    prompt.push_str("\nGenerate the next question.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_names_the_phase() {
        let prompt = build_system_prompt(Phase::FeaturesMechanics, &[]);
        assert!(prompt.contains("PHASE 2"));
        assert!(prompt.contains("Features & Mechanics"));
        assert!(!prompt.contains("FORBIDDEN"));
    }

    #[test]
    fn covered_topics_become_forbidden() {
        let prompt =
            build_system_prompt(Phase::LogisticsConstraints, &[Topic::Budget, Topic::Goals]);
        assert!(prompt.contains("FORBIDDEN"));
        assert!(prompt.contains("budget, goals"));
    }

    #[test]
    fn user_prompt_is_one_based() {
        let prompt = build_user_prompt("Neon Sushi", "Restaurant", 0, &[]);
        assert!(prompt.contains("question 1 of 10"));
        assert!(prompt.contains("Neon Sushi"));
        assert!(prompt.contains("No questions have been answered yet"));
    }

    #[test]
    fn history_is_numbered_in_order() {
        let history = vec![
            AnsweredStep::new("What are your goals?", "Sell online"),
            AnsweredStep::new("Who is your audience?", "Local foodies"),
        ];
        let prompt = build_user_prompt("Neon Sushi", "Restaurant", 2, &history);
        let first = prompt.find("1. Q: What are your goals?").unwrap();
        let second = prompt.find("2. Q: Who is your audience?").unwrap();
        assert!(first < second);
    }

    #[test]
    fn newlines_in_free_text_are_flattened() {
        let prompt = build_user_prompt("Evil\nCorp", "mod\rern", 0, &[]);
        assert!(prompt.contains("Client business: Evil Corp"));
        assert!(prompt.contains("Industry/Vibe: mod ern"));
    }
}
