use chrono::Utc;
use planner_domain::{AuthError, PlanError, StudyPlan};
use prost_types::Timestamp;
use tonic::{Code, Status};
use tracing::error;

use crate::proto_stub::study_planner::protobuf::StudyPlanMessage;

impl From<StudyPlan> for StudyPlanMessage {
    fn from(plan: StudyPlan) -> Self {
        StudyPlanMessage {
            id: plan.id,
            user_id: plan.user_id,
            subject: plan.subject,
            topics: plan.topics,
            schedule: plan.schedule,
            created_at: Some(plan.created_at.to_timestamp()),
        }
    }
}

pub trait ToTimestamp {
    fn to_timestamp(&self) -> Timestamp;
}

impl ToTimestamp for chrono::DateTime<Utc> {
    fn to_timestamp(&self) -> Timestamp {
        Timestamp {
            seconds: self.timestamp(),
            nanos: self.timestamp_subsec_nanos() as i32,
        }
    }
}

pub trait IntoStatus {
    fn into_status(self) -> Status;
}

impl IntoStatus for AuthError {
    fn into_status(self) -> Status {
        match self {
            // 400 Bad Request
            AuthError::InvalidInput(msg) => Status::new(Code::InvalidArgument, msg),

            // 409 Conflict
            AuthError::DuplicateUsername => Status::new(Code::AlreadyExists, "Username already exists"),

            // 401 Unauthorized, one message for every cause
            AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::BadSignature => {
                Status::new(Code::Unauthenticated, "Unauthorized")
            }

            // 500, details stay in the logs
            err @ (AuthError::TokenCreationError
            | AuthError::DataError(_)
            | AuthError::InternalError(_)) => {
                error!("Request failed: {}", err);
                Status::new(Code::Internal, "Internal server error")
            }
        }
    }
}

impl IntoStatus for PlanError {
    fn into_status(self) -> Status {
        match self {
            PlanError::InvalidInput(msg) => Status::new(Code::InvalidArgument, msg),
            PlanError::Auth(err) => err.into_status(),
            PlanError::Forbidden => Status::new(Code::PermissionDenied, "Plans of another user are not accessible"),
            PlanError::Generation(_) => Status::new(Code::Unavailable, "Plan generation is unavailable"),
            err @ PlanError::DataError(_) => {
                error!("Request failed: {}", err);
                Status::new(Code::Internal, "Internal server error")
            }
        }
    }
}
