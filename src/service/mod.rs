pub mod account_service;
pub mod study_plan_service;

pub use account_service::AccountGrpcServiceImpl;
pub use study_plan_service::StudyPlanGrpcServiceImpl;
