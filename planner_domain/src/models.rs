use crate::error::{AuthError, PlanError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // Username
    pub iat: i64,    // Issued at timestamp
    pub exp: i64,    // Expiration timestamp, rounded up to whole seconds
    pub iss: String, // Issuer
    pub aud: String, // Audience
    pub jti: String, // Unique token identifier
    /// Exact expiry; `verify` decides validity against this, not `exp`.
    pub expires_at: DateTime<Utc>,
}

pub type AuthResult<T> = Result<T, AuthError>;

pub type PlanResult<T> = Result<T, PlanError>;

#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudyPlan {
    pub id: String,
    pub user_id: String,
    pub subject: String,
    pub topics: Vec<String>,
    pub schedule: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// What the plan generator hands back. Missing lists default to empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeneratedPlan {
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub schedule: Vec<String>,
}
