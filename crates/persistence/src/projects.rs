//! Project store implementations

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use intake_core::{NewProject, Project, ProjectPatch, ProjectStatus};

use crate::client::RestClient;
use crate::PersistenceError;

/// Opaque keyed-record store for projects
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create(&self, project: NewProject) -> Result<Project, PersistenceError>;

    async fn get(&self, id: Uuid) -> Result<Option<Project>, PersistenceError>;

    async fn update(&self, id: Uuid, patch: ProjectPatch) -> Result<Project, PersistenceError>;

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Project>, PersistenceError>;

    /// Record a completed deposit and move the project to building.
    async fn mark_deposit_paid(&self, id: Uuid) -> Result<Project, PersistenceError> {
        self.update(id, ProjectPatch::deposit_paid()).await
    }

    /// True for stores backed by the hosted datastore.
    fn is_hosted(&self) -> bool;
}

/// Store backed by the hosted PostgREST-style datastore
pub struct RestProjectStore {
    client: RestClient,
}

impl RestProjectStore {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub async fn health_check(&self) -> Result<(), PersistenceError> {
        self.client.health_check().await
    }

    fn id_filter(id: Uuid) -> [(&'static str, String); 1] {
        [("id", format!("eq.{}", id))]
    }

    fn parse_row(row: serde_json::Value) -> Result<Project, PersistenceError> {
        serde_json::from_value(row).map_err(PersistenceError::from)
    }
}

#[async_trait]
impl ProjectStore for RestProjectStore {
    async fn create(&self, project: NewProject) -> Result<Project, PersistenceError> {
        let mut body = serde_json::to_value(&project)?;
        body["status"] = serde_json::json!(ProjectStatus::Draft);
        body["deposit_paid"] = serde_json::json!(false);

        let rows = self.client.insert("projects", &body).await?;
        let row = rows.into_iter().next().ok_or_else(|| {
            PersistenceError::Query("insert returned no rows".to_string())
        })?;
        let project = Self::parse_row(row)?;
        tracing::debug!(id = %project.id, "created project record");
        Ok(project)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Project>, PersistenceError> {
        let rows = self.client.select("projects", &Self::id_filter(id)).await?;
        rows.into_iter().next().map(Self::parse_row).transpose()
    }

    async fn update(&self, id: Uuid, patch: ProjectPatch) -> Result<Project, PersistenceError> {
        if patch.is_empty() {
            return self
                .get(id)
                .await?
                .ok_or_else(|| PersistenceError::NotFound(format!("project {}", id)));
        }

        let body = serde_json::to_value(&patch)?;
        let rows = self
            .client
            .update("projects", &Self::id_filter(id), &body)
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| PersistenceError::NotFound(format!("project {}", id)))?;
        Self::parse_row(row)
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Project>, PersistenceError> {
        let filters = [
            ("user_id", format!("eq.{}", user_id)),
            ("order", "created_at.desc".to_string()),
        ];
        let rows = self.client.select("projects", &filters).await?;
        rows.into_iter().map(Self::parse_row).collect()
    }

    fn is_hosted(&self) -> bool {
        true
    }
}

/// In-memory store for development and tests
#[derive(Default)]
pub struct InMemoryProjectStore {
    records: RwLock<HashMap<Uuid, Project>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn create(&self, project: NewProject) -> Result<Project, PersistenceError> {
        let record = Project {
            id: Uuid::new_v4(),
            business_name: project.business_name,
            vibe_style: project.vibe_style,
            domain_choice: project.domain_choice,
            status: ProjectStatus::Draft,
            user_id: project.user_id,
            client_phone: project.client_phone,
            website_type: project.website_type,
            target_audience: project.target_audience,
            deposit_paid: false,
            project_scope: project.project_scope,
            wizard_step: project.wizard_step,
            wizard_data: project.wizard_data,
            ai_price_quote: None,
            ai_reasoning: None,
            ai_features: None,
            ai_risks: None,
            ai_suggested_stack: None,
            created_at: Utc::now(),
        };

        self.records.write().insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Project>, PersistenceError> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: ProjectPatch) -> Result<Project, PersistenceError> {
        let mut records = self.records.write();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::NotFound(format!("project {}", id)))?;
        apply_patch(record, patch);
        Ok(record.clone())
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Project>, PersistenceError> {
        let mut projects: Vec<Project> = self
            .records
            .read()
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    fn is_hosted(&self) -> bool {
        false
    }
}

fn apply_patch(project: &mut Project, patch: ProjectPatch) {
    if let Some(v) = patch.business_name {
        project.business_name = v;
    }
    if let Some(v) = patch.vibe_style {
        project.vibe_style = v;
    }
    if let Some(v) = patch.domain_choice {
        project.domain_choice = v;
    }
    if let Some(v) = patch.status {
        project.status = v;
    }
    if let Some(v) = patch.deposit_paid {
        project.deposit_paid = v;
    }
    if let Some(v) = patch.project_scope {
        project.project_scope = Some(v);
    }
    if let Some(v) = patch.wizard_step {
        project.wizard_step = Some(v);
    }
    if let Some(v) = patch.wizard_data {
        project.wizard_data = Some(v);
    }
    if let Some(v) = patch.ai_price_quote {
        project.ai_price_quote = Some(v);
    }
    if let Some(v) = patch.ai_reasoning {
        project.ai_reasoning = Some(v);
    }
    if let Some(v) = patch.ai_features {
        project.ai_features = Some(v);
    }
    if let Some(v) = patch.ai_risks {
        project.ai_risks = Some(v);
    }
    if let Some(v) = patch.ai_suggested_stack {
        project.ai_suggested_stack = Some(v);
    }
}
