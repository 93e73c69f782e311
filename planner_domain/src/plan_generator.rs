use crate::error::PlanError;
use crate::models::GeneratedPlan;
use async_trait::async_trait;

/// External AI collaborator that drafts a plan for a subject. Calls may be
/// slow and may fail; failures surface as [`PlanError::Generation`].
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate_plan(&self, subject: &str) -> Result<GeneratedPlan, PlanError>;
}
