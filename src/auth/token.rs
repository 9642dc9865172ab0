//! Token issuing and validation.
//!
//! Tokens are compact ES256 JWTs. `exp` is an absolute unix timestamp and is
//! compared strictly against the validator's clock: a token is invalid at or
//! after `exp`, with no leeway. Validation failures are reported with a reason
//! for logs, but callers must answer every one of them with the same 401.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, Header, Validation, decode, decode_header, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use utoipa::ToSchema;

use super::{Role, SigningKey};

pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token signed by an unknown key")]
    UnknownKey,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("refresh token presented where an access token is required")]
    WrongUse,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// Identity claims carried by both tokens of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub token_use: TokenUse,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Self-or-admin access to the record owned by `user_id`.
    #[must_use]
    pub fn can_read(&self, user_id: &str) -> bool {
        self.is_admin() || self.sub == user_id
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: DEFAULT_ACCESS_TTL,
            refresh: DEFAULT_REFRESH_TTL,
        }
    }
}

#[derive(Debug)]
pub struct TokenIssuer {
    key: Arc<SigningKey>,
    lifetimes: TokenLifetimes,
    validation: Validation,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(key: Arc<SigningKey>, lifetimes: TokenLifetimes) -> Self {
        let mut validation = Validation::new(Algorithm::ES256);
        // `exp` is checked by hand against the caller's clock, without leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            key,
            lifetimes,
            validation,
        }
    }

    /// Issue an access/refresh pair for the subject.
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if the key cannot sign.
    pub fn issue(&self, subject: &str, email: &str, role: Role) -> Result<TokenPair, TokenError> {
        self.issue_at(subject, email, role, Utc::now().timestamp())
    }

    /// Issue a pair as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if the key cannot sign.
    pub fn issue_at(
        &self,
        subject: &str,
        email: &str,
        role: Role,
        now: i64,
    ) -> Result<TokenPair, TokenError> {
        let claims = |token_use, ttl: Duration| Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            role,
            token_use,
            iat: now,
            exp: now.saturating_add(seconds(ttl)),
        };

        Ok(TokenPair {
            access_token: self.sign(&claims(TokenUse::Access, self.lifetimes.access))?,
            refresh_token: self.sign(&claims(TokenUse::Refresh, self.lifetimes.refresh))?,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key.kid().to_string());
        encode(&header, claims, self.key.encoding_key())
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Validate a token of either use against the current time.
    ///
    /// # Errors
    /// Returns a `TokenError` describing why the token was rejected.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate a token as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    /// Returns a `TokenError` describing why the token was rejected.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::Malformed)?;
        if header.kid.as_deref() != Some(self.key.kid()) {
            return Err(TokenError::UnknownKey);
        }

        let data = decode::<Claims>(token, self.key.decoding_key(), &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if data.claims.exp <= now {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }

    /// Validate a token that must be an access token.
    ///
    /// # Errors
    /// Returns `TokenError::WrongUse` for refresh tokens, otherwise as [`Self::validate`].
    pub fn validate_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.validate(token)?;
        if claims.token_use != TokenUse::Access {
            return Err(TokenError::WrongUse);
        }
        Ok(claims)
    }
}

fn seconds(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}
