//! Funnel phases
//!
//! The ten-step funnel is split into three fixed phases. The phase is a pure
//! function of the step index - history never influences it - and each phase
//! constrains what the generator may ask about.

/// Discovery phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Steps 0-2: business model, audience, success metric
    IdentityGoals,
    /// Steps 3-6: concrete website capabilities
    FeaturesMechanics,
    /// Steps 7-9: timeline, content readiness, budget, maintenance
    LogisticsConstraints,
}

impl Phase {
    /// Classify a step index. Indices past the funnel budget fall into the
    /// last phase; callers check termination before classifying.
    pub fn for_index(index: usize) -> Self {
        match index {
            0..=2 => Phase::IdentityGoals,
            3..=6 => Phase::FeaturesMechanics,
            _ => Phase::LogisticsConstraints,
        }
    }

    /// 1-based phase number used in prompts
    pub fn number(&self) -> u8 {
        match self {
            Phase::IdentityGoals => 1,
            Phase::FeaturesMechanics => 2,
            Phase::LogisticsConstraints => 3,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::IdentityGoals => "Identity & Goals",
            Phase::FeaturesMechanics => "Features & Mechanics",
            Phase::LogisticsConstraints => "Logistics & Constraints",
        }
    }

    /// Focus instruction constraining what this phase may ask about
    pub fn focus(&self) -> &'static str {
        match self {
            Phase::IdentityGoals =>
                "Ask ONLY about the business itself: what it does, who the target audience is, \
                 and what success with the new website would look like. \
                 Do not ask about features, budget, or timelines yet.",
            Phase::FeaturesMechanics =>
                "Ask ONLY about concrete website capabilities: pages, online selling, bookings, \
                 photo galleries, member areas, ways to update content. \
                 Do not revisit goals and do not ask about budget or timelines yet.",
            Phase::LogisticsConstraints =>
                "Ask ONLY about practical constraints: launch timeline, whether text and photos \
                 are ready, budget comfort, and who maintains the site after launch.",
        }
    }
}
