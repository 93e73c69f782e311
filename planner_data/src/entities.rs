//! Database entities for accounts and study plans

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account entity for MongoDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountEntity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub salted_hash: SaltedHash,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl AccountEntity {
    pub fn new(username: String, salted_hash: SaltedHash) -> Self {
        Self {
            id: None,
            username,
            salted_hash,
            created_at: Utc::now(),
        }
    }
}

/// Stored password hash. Salt and hash are hex encoded; the algorithm and
/// iteration count travel with the record so verification does not depend
/// on the current hasher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaltedHash {
    pub algorithm: String,
    pub iterations: u32,
    pub salt: String,
    pub hash: String,
}

/// Study plan entity for MongoDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlanEntity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub subject: String,
    pub topics: Vec<String>,
    pub schedule: Vec<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl StudyPlanEntity {
    pub fn new(user_id: String, subject: String, topics: Vec<String>, schedule: Vec<String>) -> Self {
        Self {
            id: None,
            user_id,
            subject,
            topics,
            schedule,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;
    use chrono::TimeZone;

    #[test]
    fn test_created_at_is_stored_as_bson_datetime() {
        let mut plan = StudyPlanEntity::new(
            "alice".to_string(),
            "Biology".to_string(),
            vec!["Cells".to_string()],
            vec![],
        );
        plan.created_at = Utc.timestamp_millis_opt(1_709_294_400_120).unwrap();

        let document = bson::to_document(&plan).unwrap();
        assert!(matches!(document.get("created_at"), Some(Bson::DateTime(_))));

        let restored: StudyPlanEntity = bson::from_document(document).unwrap();
        assert_eq!(restored.created_at, plan.created_at);

        let account = AccountEntity::new(
            "alice".to_string(),
            SaltedHash {
                algorithm: "pbkdf2-sha256".to_string(),
                iterations: 1,
                salt: "00".to_string(),
                hash: "00".to_string(),
            },
        );
        let document = bson::to_document(&account).unwrap();
        assert!(matches!(document.get("created_at"), Some(Bson::DateTime(_))));
    }
}
