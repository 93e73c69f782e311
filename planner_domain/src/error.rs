use planner_data::DataError;
use thiserror::Error;

/// Account and session errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token creation error")]
    TokenCreationError,

    #[error("Data error: {0}")]
    DataError(DataError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Failures that callers only ever see as a generic "unauthorized"
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::BadSignature
        )
    }
}

impl From<DataError> for AuthError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::DuplicateUsername => AuthError::DuplicateUsername,
            other => AuthError::DataError(other),
        }
    }
}

/// Study plan errors
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Plans of another user are not accessible")]
    Forbidden,

    #[error("Plan generation failed: {0}")]
    Generation(String),

    #[error("Data error: {0}")]
    DataError(#[from] DataError),
}
