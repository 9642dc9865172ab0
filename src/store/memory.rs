//! In-process user store, used when no database is configured and by tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use super::{StoreError, UserFilter, UserRecord, UserStore};
use crate::auth::TokenPair;

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<UserRecord>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn count_matching(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let users = self.users.read().await;
        let count = users.iter().filter(|user| filter.matches(user)).count();
        u64::try_from(count).map_err(|e| StoreError::Backend(e.to_string()))
    }

    #[instrument(skip(self, record), fields(user_id = %record.user_id))]
    async fn insert_one(&self, record: UserRecord) -> Result<Uuid, StoreError> {
        // Check and insert under one write lock so concurrent signups cannot both win.
        let mut users = self.users.write().await;
        let taken = UserFilter::EmailOrPhone {
            email: record.email.clone(),
            phone: record.phone.clone(),
        };
        if users.iter().any(|user| taken.matches(user)) {
            return Err(StoreError::Conflict);
        }
        let user_id = record.user_id;
        users.push(record);
        Ok(user_id)
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| filter.matches(user)).cloned())
    }

    async fn find_all(&self, filter: &UserFilter) -> Result<Vec<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect())
    }

    async fn update_tokens(&self, user_id: Uuid, tokens: &TokenPair) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|user| user.user_id == user_id) else {
            return Ok(false);
        };
        user.token = Some(tokens.access_token.clone());
        user.refresh_token = Some(tokens.refresh_token.clone());
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
