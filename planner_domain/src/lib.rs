pub mod error;
pub mod service;
pub mod plan_service;
pub mod plan_generator;
pub mod models;
pub mod token_service;
pub mod hashing_service;
mod mappers;

pub use error::{AuthError, PlanError};
pub use hashing_service::{HashingService, Pbkdf2HashingService};
pub use service::{AccountService, AccountServiceImpl};
pub use plan_service::{StudyPlanService, StudyPlanServiceImpl};
pub use plan_generator::PlanGenerator;
pub use models::{Account, AuthResult, GeneratedPlan, PlanResult, StudyPlan};
pub use token_service::{JwtTokenService, TokenConfig, TokenService};
