//! In-memory repositories for tests. Uniqueness of usernames is enforced
//! under a single write lock, mirroring the unique index on the Mongo side.

use crate::entities::{AccountEntity, StudyPlanEntity};
use crate::error::DataError;
use crate::repositories::{AccountRepository, StudyPlanRepository};
use async_trait::async_trait;
use bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<String, AccountEntity>>,
    unavailable: AtomicBool,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn count(&self) -> usize {
        self.accounts.read().await.len()
    }

    fn check_available(&self) -> Result<(), DataError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DataError::MongoError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<AccountEntity>, DataError> {
        self.check_available()?;
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn insert_unique(&self, account: AccountEntity) -> Result<AccountEntity, DataError> {
        self.check_available()?;
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.username) {
            return Err(DataError::DuplicateUsername);
        }

        let account = AccountEntity {
            id: Some(ObjectId::new()),
            ..account
        };
        accounts.insert(account.username.clone(), account.clone());
        Ok(account)
    }
}

#[derive(Default)]
pub struct InMemoryStudyPlanRepository {
    plans: RwLock<Vec<StudyPlanEntity>>,
}

impl InMemoryStudyPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudyPlanRepository for InMemoryStudyPlanRepository {
    async fn insert_plan(&self, plan: StudyPlanEntity) -> Result<StudyPlanEntity, DataError> {
        let plan = StudyPlanEntity {
            id: Some(ObjectId::new()),
            ..plan
        };
        self.plans.write().await.push(plan.clone());
        Ok(plan)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<StudyPlanEntity>, DataError> {
        Ok(self
            .plans
            .read()
            .await
            .iter()
            .filter(|plan| plan.user_id == user_id)
            .cloned()
            .collect())
    }
}
