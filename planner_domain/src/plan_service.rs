use crate::error::PlanError;
use crate::mappers::plan_entity_to_plan;
use crate::models::{PlanResult, StudyPlan};
use crate::plan_generator::PlanGenerator;
use crate::service::AccountService;
use async_trait::async_trait;
use planner_data::entities::StudyPlanEntity;
use planner_data::repositories::StudyPlanRepository;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Study plan operations. Every call must carry a session token issued for
/// `user_id`.
#[async_trait]
pub trait StudyPlanService: Send + Sync {
    /// Generate a plan for `subject` and store it for the user
    async fn generate_plan(
        &self,
        session_token: &str,
        user_id: &str,
        subject: &str,
    ) -> PlanResult<StudyPlan>;

    /// All stored plans of the user, oldest first
    async fn get_plans(&self, session_token: &str, user_id: &str) -> PlanResult<Vec<StudyPlan>>;
}

pub struct StudyPlanServiceImpl {
    account_service: Arc<dyn AccountService>,
    plan_repository: Arc<dyn StudyPlanRepository>,
    plan_generator: Arc<dyn PlanGenerator>,
}

impl StudyPlanServiceImpl {
    pub fn new(
        account_service: Arc<dyn AccountService>,
        plan_repository: Arc<dyn StudyPlanRepository>,
        plan_generator: Arc<dyn PlanGenerator>,
    ) -> Self {
        Self {
            account_service,
            plan_repository,
            plan_generator,
        }
    }

    fn authorize(&self, session_token: &str, user_id: &str) -> PlanResult<()> {
        let subject = self.account_service.authenticate(session_token)?;
        if subject != user_id {
            warn!(subject = %subject, user_id, "Rejected access to another user's plans");
            return Err(PlanError::Forbidden);
        }
        Ok(())
    }
}

#[async_trait]
impl StudyPlanService for StudyPlanServiceImpl {
    async fn generate_plan(
        &self,
        session_token: &str,
        user_id: &str,
        subject: &str,
    ) -> PlanResult<StudyPlan> {
        self.authorize(session_token, user_id)?;

        let subject = subject.trim();
        if subject.is_empty() {
            return Err(PlanError::InvalidInput("subject must not be empty".to_string()));
        }

        let generated = self.plan_generator.generate_plan(subject).await.map_err(|e| {
            error!(subject, "Plan generation failed: {}", e);
            e
        })?;

        let plan = self
            .plan_repository
            .insert_plan(StudyPlanEntity::new(
                user_id.to_string(),
                subject.to_string(),
                generated.topics,
                generated.schedule,
            ))
            .await
            .map_err(|e| {
                error!("Failed to store study plan: {}", e);
                PlanError::from(e)
            })?;

        info!(user_id, subject, "Stored study plan");
        Ok(plan_entity_to_plan(plan))
    }

    async fn get_plans(&self, session_token: &str, user_id: &str) -> PlanResult<Vec<StudyPlan>> {
        self.authorize(session_token, user_id)?;

        let plans = self
            .plan_repository
            .find_by_user_id(user_id)
            .await
            .map_err(|e| {
                error!("Failed to load study plans: {}", e);
                PlanError::from(e)
            })?;

        Ok(plans.into_iter().map(plan_entity_to_plan).collect())
    }
}
