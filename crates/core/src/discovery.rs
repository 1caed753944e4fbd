//! Discovery funnel wire types
//!
//! The funnel exchanges these two shapes with the frontend wizard: the next
//! question to show, and the accumulated history of already-answered
//! questions. History order is chronological and must be replayed verbatim
//! on every call.

use serde::{Deserialize, Serialize};

/// One question in the discovery funnel.
///
/// A terminal step carries an empty question, no options and
/// `is_complete = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionStep {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub allow_multiple: bool,
    #[serde(default)]
    pub is_complete: bool,
}

impl QuestionStep {
    /// A regular, non-terminal question.
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        allow_multiple: bool,
    ) -> Self {
        Self {
            question: question.into(),
            options,
            allow_multiple,
            is_complete: false,
        }
    }

    /// The terminal marker: no further questions should be requested.
    pub fn terminal() -> Self {
        Self {
            question: String::new(),
            options: Vec::new(),
            allow_multiple: false,
            is_complete: true,
        }
    }

    /// Whether this step ends the funnel.
    pub fn is_terminal(&self) -> bool {
        self.is_complete && self.question.is_empty()
    }
}

/// A question the client has already answered.
///
/// Serialized with the short `q`/`a` field names used on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredStep {
    #[serde(rename = "q")]
    pub question: String,
    #[serde(rename = "a")]
    pub answer: String,
}

impl AnsweredStep {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_step_shape() {
        let step = QuestionStep::terminal();
        assert!(step.question.is_empty());
        assert!(step.options.is_empty());
        assert!(!step.allow_multiple);
        assert!(step.is_complete);
        assert!(step.is_terminal());
    }

    #[test]
    fn answered_step_wire_names() {
        let step = AnsweredStep::new("What are your goals?", "Sell online");
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["q"], "What are your goals?");
        assert_eq!(json["a"], "Sell online");

        let back: AnsweredStep =
            serde_json::from_str(r#"{"q":"Q","a":"A"}"#).unwrap();
        assert_eq!(back.question, "Q");
        assert_eq!(back.answer, "A");
    }

    #[test]
    fn question_step_defaults_on_deserialize() {
        let step: QuestionStep =
            serde_json::from_str(r#"{"question":"Launch when?"}"#).unwrap();
        assert_eq!(step.question, "Launch when?");
        assert!(step.options.is_empty());
        assert!(!step.allow_multiple);
        assert!(!step.is_complete);
    }
}
