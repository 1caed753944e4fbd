//! Fixed question content
//!
//! Two kinds of hand-authored content back the funnel when the generator
//! cannot: the ten-step canned sequence served when no generation credential
//! is configured, and the single fallback question served when a live
//! generation call fails mid-funnel.

use intake_core::QuestionStep;

/// The canned sequence, one entry per step: question, options, multi-select.
const CANNED: &[(&str, &[&str], bool)] = &[
    (
        "What are the main goals of your new website?",
        &[
            "Get more local customers",
            "Sell products online",
            "Showcase portfolio",
            "Book appointments",
        ],
        true,
    ),
    (
        "How many visitors do you expect in a typical month?",
        &["Under 500", "500 to 5,000", "5,000 to 50,000", "No idea yet"],
        false,
    ),
    (
        "Do you already have a logo and brand colors?",
        &["Yes, both", "Logo only", "Colors only", "Starting from scratch"],
        false,
    ),
    (
        "Which features should your website include?",
        &[
            "Contact form",
            "Online store",
            "Photo gallery",
            "Customer accounts",
            "Blog or news",
        ],
        true,
    ),
    (
        "What budget range feels comfortable for this project?",
        &[
            "Under $1,000",
            "$1,000 to $3,000",
            "$3,000 to $10,000",
            "Not sure yet",
        ],
        false,
    ),
    (
        "When would you like the website to go live?",
        &[
            "Within a month",
            "1 to 3 months",
            "3 to 6 months",
            "No firm deadline",
        ],
        false,
    ),
    (
        "Who will keep the site updated after launch?",
        &[
            "We will, ourselves",
            "We'd like you to handle it",
            "A mix of both",
            "Haven't thought about it",
        ],
        false,
    ),
    (
        "Should the website connect to any tools you already use?",
        &[
            "Email newsletter",
            "Online payments",
            "Booking or calendar",
            "Social media",
            "None of these",
        ],
        true,
    ),
    (
        "Which look and feel fits your brand best?",
        &[
            "Clean and minimal",
            "Bold and colorful",
            "Classic and elegant",
            "Warm and friendly",
        ],
        false,
    ),
    (
        "Anything else we should know before preparing your quote?",
        &["That covers everything", "I have a few more notes to add"],
        false,
    ),
];

/// The canned step at `index`, or `None` past the end of the sequence.
pub fn canned_step(index: usize) -> Option<QuestionStep> {
    CANNED.get(index).map(|(question, options, allow_multiple)| {
        QuestionStep::new(
            *question,
            options.iter().map(|s| s.to_string()).collect(),
            *allow_multiple,
        )
    })
}

/// The fixed fallback question served when a live generation call fails.
pub fn fallback_step() -> QuestionStep {
    QuestionStep::new(
        "What is your estimated timeline for launch?",
        vec![
            "As soon as possible".to_string(),
            "Within 3 months".to_string(),
            "3 to 6 months".to_string(),
            "Flexible".to_string(),
        ],
        false,
    )
}
