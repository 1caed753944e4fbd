//! Topic tagging for loop prevention
//!
//! A coarse keyword-to-tag table over the text of already-asked questions.
//! Once a keyword has appeared in any prior question, its topic is listed as
//! forbidden in the next prompt. Matching is case-insensitive substring
//! matching over free text: false positives and negatives are expected and
//! acceptable - the directive is advisory to the generator, not enforced.

use intake_core::AnsweredStep;

/// Topic tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Goals,
    Audience,
    Features,
    Budget,
    Timeline,
    Content,
    Integrations,
    Design,
}

/// Keyword-to-tag table. One keyword per tag, matched as a substring.
const KEYWORDS: &[(&str, Topic)] = &[
    ("goals", Topic::Goals),
    ("audience", Topic::Audience),
    ("features", Topic::Features),
    ("budget", Topic::Budget),
    ("timeline", Topic::Timeline),
    ("content", Topic::Content),
    ("integrations", Topic::Integrations),
    ("design", Topic::Design),
];

impl Topic {
    /// The keyword that triggers this tag, also used as its prompt label
    pub fn keyword(&self) -> &'static str {
        match self {
            Topic::Goals => "goals",
            Topic::Audience => "audience",
            Topic::Features => "features",
            Topic::Budget => "budget",
            Topic::Timeline => "timeline",
            Topic::Content => "content",
            Topic::Integrations => "integrations",
            Topic::Design => "design",
        }
    }
}

/// Collect the topics already covered by prior questions, in first-seen
/// order. Duplicates are harmless; each topic appears at most once.
pub fn covered_topics(history: &[AnsweredStep]) -> Vec<Topic> {
    let mut covered = Vec::new();
    for step in history {
        let question = step.question.to_lowercase();
        for (keyword, topic) in KEYWORDS {
            if question.contains(keyword) && !covered.contains(topic) {
                covered.push(*topic);
            }
        }
    }
    covered
}
