//! Repository implementations for account and study plan data access

use crate::entities::{AccountEntity, StudyPlanEntity};
use crate::error::{is_duplicate_key, DataError};
use async_trait::async_trait;
use bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Account repository trait
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by username
    async fn find_by_username(&self, username: &str) -> Result<Option<AccountEntity>, DataError>;

    /// Insert a new account. Fails with [`DataError::DuplicateUsername`] if
    /// the username is already taken, even under concurrent inserts.
    async fn insert_unique(&self, account: AccountEntity) -> Result<AccountEntity, DataError>;
}

/// Study plan repository trait
#[async_trait]
pub trait StudyPlanRepository: Send + Sync {
    /// Append a plan
    async fn insert_plan(&self, plan: StudyPlanEntity) -> Result<StudyPlanEntity, DataError>;

    /// All plans of a user, oldest first
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<StudyPlanEntity>, DataError>;
}

/// MongoDB implementation of AccountRepository
pub struct MongoAccountRepository {
    db: Arc<RwLock<Database>>,
    collection_name: String,
}

impl MongoAccountRepository {
    /// Create a new MongoDB account repository
    pub fn new(db: Arc<RwLock<Database>>, collection_name: String) -> Self {
        Self {
            db,
            collection_name,
        }
    }

    /// Get the accounts collection
    async fn collection(&self) -> Collection<AccountEntity> {
        self.db.read().await.collection(&self.collection_name)
    }

    /// Create the unique username index that `insert_unique` relies on
    pub async fn ensure_indexes(&self) -> Result<(), DataError> {
        let index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(
                IndexOptions::builder()
                    .name("username_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.collection().await.create_index(index).await?;
        info!(collection = %self.collection_name, "Ensured unique username index");
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MongoAccountRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<AccountEntity>, DataError> {
        let filter = doc! { "username": username };
        let coll = self.collection().await;
        let result = coll.find_one(filter).await?;
        Ok(result)
    }

    async fn insert_unique(&self, account: AccountEntity) -> Result<AccountEntity, DataError> {
        let coll = self.collection().await;

        let result = coll.insert_one(&account).await.map_err(|e| {
            if is_duplicate_key(&e) {
                debug!("Duplicate key on insert for username");
                DataError::DuplicateUsername
            } else {
                DataError::from(e)
            }
        })?;

        Ok(AccountEntity {
            id: result.inserted_id.as_object_id(),
            ..account
        })
    }
}

/// MongoDB implementation of StudyPlanRepository
pub struct MongoStudyPlanRepository {
    db: Arc<RwLock<Database>>,
    collection_name: String,
}

impl MongoStudyPlanRepository {
    /// Create a new MongoDB study plan repository
    pub fn new(db: Arc<RwLock<Database>>, collection_name: String) -> Self {
        Self {
            db,
            collection_name,
        }
    }

    /// Get the study plans collection
    async fn collection(&self) -> Collection<StudyPlanEntity> {
        self.db.read().await.collection(&self.collection_name)
    }

    pub async fn ensure_indexes(&self) -> Result<(), DataError> {
        let index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_at": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_id_created_at".to_string())
                    .build(),
            )
            .build();

        self.collection().await.create_index(index).await?;
        info!(collection = %self.collection_name, "Ensured user_id index");
        Ok(())
    }
}

#[async_trait]
impl StudyPlanRepository for MongoStudyPlanRepository {
    async fn insert_plan(&self, plan: StudyPlanEntity) -> Result<StudyPlanEntity, DataError> {
        let coll = self.collection().await;
        let result = coll.insert_one(&plan).await?;

        Ok(StudyPlanEntity {
            id: result.inserted_id.as_object_id(),
            ..plan
        })
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<StudyPlanEntity>, DataError> {
        let coll = self.collection().await;
        let filter = doc! { "user_id": user_id };

        let mut cursor = coll
            .find(filter)
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?;

        let mut plans = Vec::new();
        while cursor.advance().await? {
            plans.push(cursor.deserialize_current()?);
        }

        Ok(plans)
    }
}
