//! Project records
//!
//! A project is one prospective website build: the client's business
//! identity, the wizard state, the generated quote and the payment state.
//! Records live in the hosted datastore; these types are the typed view of
//! its `projects` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Wizard in progress, nothing committed yet
    #[default]
    Draft,
    /// A quote has been generated for the project
    Quoted,
    /// Wizard finalized, proposal shown to the client
    ProposalReady,
    /// Deposit paid, development underway
    Building,
    /// Delivered
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Quoted => "quoted",
            ProjectStatus::ProposalReady => "proposal_ready",
            ProjectStatus::Building => "building",
            ProjectStatus::Completed => "completed",
        }
    }
}

/// AI-generated price quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub reasoning: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub suggested_stack: String,
}

/// A stored project record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub business_name: String,
    pub vibe_style: String,
    pub domain_choice: String,
    #[serde(default)]
    pub status: ProjectStatus,
    pub user_id: String,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub website_type: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub deposit_paid: bool,
    #[serde(default)]
    pub project_scope: Option<serde_json::Value>,
    #[serde(default)]
    pub wizard_step: Option<u32>,
    #[serde(default)]
    pub wizard_data: Option<serde_json::Value>,
    #[serde(default)]
    pub ai_price_quote: Option<f64>,
    #[serde(default)]
    pub ai_reasoning: Option<String>,
    #[serde(default)]
    pub ai_features: Option<Vec<String>>,
    #[serde(default)]
    pub ai_risks: Option<Vec<String>>,
    #[serde(default)]
    pub ai_suggested_stack: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub business_name: String,
    pub vibe_style: String,
    pub domain_choice: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_scope: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wizard_step: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wizard_data: Option<serde_json::Value>,
}

/// Incremental update to a project. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibe_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_choice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_scope: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wizard_step: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wizard_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_price_quote: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_risks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_suggested_stack: Option<String>,
}

impl ProjectPatch {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .map(|v| v.as_object().map(|o| o.is_empty()).unwrap_or(true))
            .unwrap_or(true)
    }

    /// Patch recording a freshly generated quote. Status is left untouched;
    /// callers set it when the quote changes the lifecycle.
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            ai_price_quote: Some(quote.price),
            ai_reasoning: Some(quote.reasoning.clone()),
            ai_features: Some(quote.features.clone()),
            ai_risks: Some(quote.risks.clone()),
            ai_suggested_stack: Some(quote.suggested_stack.clone()),
            ..Self::default()
        }
    }

    /// Patch marking the deposit as paid and moving the project to building.
    pub fn deposit_paid() -> Self {
        Self {
            deposit_paid: Some(true),
            status: Some(ProjectStatus::Building),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        let json = serde_json::to_string(&ProjectStatus::ProposalReady).unwrap();
        assert_eq!(json, r#""proposal_ready""#);
        let back: ProjectStatus = serde_json::from_str(r#""building""#).unwrap();
        assert_eq!(back, ProjectStatus::Building);
    }

    #[test]
    fn empty_patch_detected() {
        assert!(ProjectPatch::default().is_empty());
        let patch = ProjectPatch {
            wizard_step: Some(3),
            ..ProjectPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn deposit_patch_moves_to_building() {
        let patch = ProjectPatch::deposit_paid();
        assert_eq!(patch.deposit_paid, Some(true));
        assert_eq!(patch.status, Some(ProjectStatus::Building));
        assert!(patch.business_name.is_none());
    }

    #[test]
    fn quote_patch_carries_all_fields() {
        let quote = Quote {
            price: 1200.0,
            reasoning: "Standard portfolio site".into(),
            features: vec!["Contact form".into()],
            risks: vec![],
            suggested_stack: "Next.js".into(),
        };
        let patch = ProjectPatch::from_quote(&quote);
        assert_eq!(patch.ai_price_quote, Some(1200.0));
        assert_eq!(patch.status, None);
        assert_eq!(patch.ai_features.as_deref(), Some(&["Contact form".to_string()][..]));
    }
}
