//! Persistence boundary for user accounts.
//!
//! The account service only talks to [`UserStore`]. Uniqueness of `email` and
//! `phone` is the store's job: `insert_one` must reject duplicates atomically,
//! and that rejection is the only source of [`StoreError::Conflict`].

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{Role, TokenPair};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email or phone already exists")]
    Conflict,
    #[error("invalid stored record: {0}")]
    Corrupt(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::Conflict;
            }
        }
        Self::Backend(err.to_string())
    }
}

/// Stored account. `password_hash` is a PHC string, never plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("role", &self.role)
            .field("password_hash", &"***")
            .finish_non_exhaustive()
    }
}

/// Record selector understood by every store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserFilter {
    All,
    Email(String),
    Phone(String),
    UserId(Uuid),
    EmailOrPhone { email: String, phone: String },
}

impl UserFilter {
    #[must_use]
    pub fn matches(&self, record: &UserRecord) -> bool {
        match self {
            Self::All => true,
            Self::Email(email) => record.email == *email,
            Self::Phone(phone) => record.phone == *phone,
            Self::UserId(id) => record.user_id == *id,
            Self::EmailOrPhone { email, phone } => {
                record.email == *email || record.phone == *phone
            }
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync + fmt::Debug {
    async fn count_matching(&self, filter: &UserFilter) -> Result<u64, StoreError>;

    /// Insert a new account, failing with `Conflict` if its email or phone is taken.
    async fn insert_one(&self, record: UserRecord) -> Result<Uuid, StoreError>;

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<UserRecord>, StoreError>;

    async fn find_all(&self, filter: &UserFilter) -> Result<Vec<UserRecord>, StoreError>;

    /// Replace the session tokens on an account. Returns `false` if no such user.
    async fn update_tokens(&self, user_id: Uuid, tokens: &TokenPair) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(email: &str, phone: &str, role: Role) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            user_id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string(),
            role,
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn filter_matches_fields() {
        let user = record("a@b.com", "555", Role::User);
        assert!(UserFilter::All.matches(&user));
        assert!(UserFilter::Email("a@b.com".to_string()).matches(&user));
        assert!(!UserFilter::Email("x@b.com".to_string()).matches(&user));
        assert!(UserFilter::Phone("555".to_string()).matches(&user));
        assert!(UserFilter::UserId(user.user_id).matches(&user));
        assert!(!UserFilter::UserId(Uuid::new_v4()).matches(&user));
        assert!(
            UserFilter::EmailOrPhone {
                email: "x@b.com".to_string(),
                phone: "555".to_string(),
            }
            .matches(&user)
        );
    }

    #[test]
    fn record_debug_hides_hash() {
        let user = record("a@b.com", "555", Role::User);
        let debug = format!("{user:?}");
        assert!(!debug.contains("argon2"));
        assert!(debug.contains("a@b.com"));
    }
}
