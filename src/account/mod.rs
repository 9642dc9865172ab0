//! Account orchestration: signup, login, and the two user reads.
//!
//! Flow Overview:
//! 1) Validate input shape (names, email, phone, password length, role).
//! 2) Hash or verify the password on the blocking pool.
//! 3) Issue a token pair and persist through the [`UserStore`].
//!
//! Every store call runs under a deadline; elapsing it is a storage failure.

pub mod types;

pub use types::{LoginRequest, LoginResponse, SignupRequest, SignupResponse, UserView};

use chrono::Utc;
use regex::Regex;
use std::{future::Future, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::task;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        HashingError, PasswordHasher, Role, TokenError, TokenIssuer, TokenPair,
        password::PasswordHash,
    },
    store::{StoreError, UserFilter, UserRecord, UserStore},
};

pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(60);

const NAME_LEN: std::ops::RangeInclusive<usize> = 2..=100;
const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 6..=18;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),
    #[error("email or phone already exists")]
    Conflict,
    #[error("invalid email or password")]
    Authentication,
    #[error("user not found")]
    NotFound,
    #[error("storage failure: {0}")]
    Storage(String),
    #[error(transparent)]
    Hashing(#[from] HashingError),
    #[error("failed to issue tokens: {0}")]
    Token(#[from] TokenError),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Lightweight email sanity check used before persisting data.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

struct NewAccount {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    password: String,
    role: Role,
}

fn required(value: Option<String>, field: &str) -> Result<String, AccountError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AccountError::Validation(format!("{field} is required"))),
    }
}

fn check_len(
    value: &str,
    field: &str,
    range: &std::ops::RangeInclusive<usize>,
) -> Result<(), AccountError> {
    let len = value.chars().count();
    if range.contains(&len) {
        Ok(())
    } else {
        Err(AccountError::Validation(format!(
            "{field} must be between {} and {} characters",
            range.start(),
            range.end()
        )))
    }
}

fn validate_signup(request: SignupRequest) -> Result<NewAccount, AccountError> {
    let first_name = required(request.first_name, "first_name")?;
    check_len(&first_name, "first_name", &NAME_LEN)?;

    let last_name = required(request.last_name, "last_name")?;
    check_len(&last_name, "last_name", &NAME_LEN)?;

    let email = normalize_email(&required(request.email, "email")?);
    if !valid_email(&email) {
        return Err(AccountError::Validation("email is invalid".to_string()));
    }

    let phone = required(request.phone, "phone")?;

    // Passwords are not trimmed; whitespace is part of the secret.
    let password = match request.password {
        Some(password) if !password.is_empty() => password,
        _ => return Err(AccountError::Validation("password is required".to_string())),
    };
    check_len(&password, "password", &PASSWORD_LEN)?;

    let role = required(request.role, "role")?
        .parse::<Role>()
        .map_err(|e| AccountError::Validation(e.to_string()))?;

    Ok(NewAccount {
        first_name,
        last_name,
        email,
        phone,
        password,
        role,
    })
}

#[derive(Debug, Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    issuer: Arc<TokenIssuer>,
    storage_timeout: Duration,
}

impl AccountService {
    #[must_use]
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, AccountError> {
        match tokio::time::timeout(self.storage_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(StoreError::Conflict)) => Err(AccountError::Conflict),
            Ok(Err(err)) => {
                error!("Store {operation} failed: {err}");
                Err(AccountError::Storage(err.to_string()))
            }
            Err(_) => {
                error!(
                    "Store {operation} timed out after {}s",
                    self.storage_timeout.as_secs()
                );
                Err(AccountError::Storage(format!("{operation} timed out")))
            }
        }
    }

    async fn hash_password(&self, password: String) -> Result<PasswordHash, AccountError> {
        let hasher = Arc::clone(&self.hasher);
        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))?
            .map_err(AccountError::from)
    }

    /// Verify on the blocking pool. A missing hash still costs one verification.
    async fn verify_password(
        &self,
        password: String,
        hash: Option<String>,
    ) -> Result<bool, AccountError> {
        let hasher = Arc::clone(&self.hasher);
        task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&password, &PasswordHash::from(hash)),
            None => hasher.verify_missing(&password),
        })
        .await
        .map_err(|e| AccountError::Internal(e.to_string()))
    }

    /// Create an account and its first token pair.
    ///
    /// # Errors
    /// `Validation` for bad input, `Conflict` if email or phone is taken,
    /// `Storage` if the store fails or times out.
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: SignupRequest) -> Result<SignupResponse, AccountError> {
        let account = validate_signup(request)?;
        debug!(email = %account.email, role = %account.role, "signup input accepted");

        let password_hash = self.hash_password(account.password).await?;

        let user_id = Uuid::new_v4();
        let tokens = self
            .issuer
            .issue(&user_id.to_string(), &account.email, account.role)?;

        let now = Utc::now();
        let record = UserRecord {
            user_id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            phone: account.phone,
            password_hash: password_hash.into_string(),
            role: account.role,
            token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            created_at: now,
            updated_at: now,
        };

        let user_id = self
            .with_deadline("insert_one", self.store.insert_one(record))
            .await?;

        info!(%user_id, "user created");

        Ok(SignupResponse {
            message: "user created successfully".to_string(),
            user_id: user_id.to_string(),
        })
    }

    /// Check credentials and hand out a fresh token pair.
    ///
    /// Unknown email and wrong password return the same `Authentication` error.
    ///
    /// # Errors
    /// `Validation` for missing fields, `Authentication` for bad credentials,
    /// `Storage` if the store fails or times out.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AccountError> {
        let email = normalize_email(&required(request.email, "email")?);
        let password = match request.password {
            Some(password) if !password.is_empty() => password,
            _ => return Err(AccountError::Validation("password is required".to_string())),
        };

        let found = self
            .with_deadline(
                "find_one",
                self.store.find_one(&UserFilter::Email(email.clone())),
            )
            .await?;

        let stored_hash = found.as_ref().map(|user| user.password_hash.clone());
        let verified = self.verify_password(password, stored_hash).await?;

        let user = match found {
            Some(user) if verified => user,
            Some(user) => {
                warn!(user_id = %user.user_id, "login with wrong password");
                return Err(AccountError::Authentication);
            }
            None => {
                warn!("login for unknown email");
                return Err(AccountError::Authentication);
            }
        };

        let tokens: TokenPair =
            self.issuer
                .issue(&user.user_id.to_string(), &user.email, user.role)?;

        if !self
            .with_deadline(
                "update_tokens",
                self.store.update_tokens(user.user_id, &tokens),
            )
            .await?
        {
            warn!(user_id = %user.user_id, "user vanished during login");
            return Err(AccountError::Authentication);
        }

        info!(user_id = %user.user_id, "user logged in");

        Ok(LoginResponse {
            user: UserView::from(user),
            token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// # Errors
    /// `Storage` if the store fails or times out.
    pub async fn list_users(&self) -> Result<Vec<UserView>, AccountError> {
        let users = self
            .with_deadline("find_all", self.store.find_all(&UserFilter::All))
            .await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    /// Fetch one account; ids that are not UUIDs cannot exist and yield `NotFound`.
    ///
    /// # Errors
    /// `NotFound` if there is no such user, `Storage` on store failure.
    pub async fn get_user(&self, user_id: &str) -> Result<UserView, AccountError> {
        let Ok(id) = Uuid::parse_str(user_id.trim()) else {
            return Err(AccountError::NotFound);
        };
        self.with_deadline("find_one", self.store.find_one(&UserFilter::UserId(id)))
            .await?
            .map(UserView::from)
            .ok_or(AccountError::NotFound)
    }

    /// # Errors
    /// `Storage` if the store is unreachable or times out.
    pub async fn ping_store(&self) -> Result<(), AccountError> {
        self.with_deadline("ping", self.store.ping()).await
    }
}
