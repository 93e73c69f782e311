use crate::models::{Account, StudyPlan};
use planner_data::entities::{AccountEntity, StudyPlanEntity};

pub fn account_entity_to_account(account: AccountEntity) -> Account {
    Account {
        id: account.id.map(|id| id.to_hex()).unwrap_or_default(),
        username: account.username,
        created_at: account.created_at,
    }
}

pub fn plan_entity_to_plan(plan: StudyPlanEntity) -> StudyPlan {
    StudyPlan {
        id: plan.id.map(|id| id.to_hex()).unwrap_or_default(),
        user_id: plan.user_id,
        subject: plan.subject,
        topics: plan.topics,
        schedule: plan.schedule,
        created_at: plan.created_at,
    }
}
