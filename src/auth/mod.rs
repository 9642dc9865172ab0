//! Authentication core: password hashing, signing keys, and tokens.
//!
//! Flow Overview:
//! 1) `password` turns a credential into an Argon2id PHC string and back.
//! 2) `key` loads or generates the ES256 key pair once at start-up.
//! 3) `token` signs and validates access/refresh tokens with that key.

pub mod key;
pub mod password;
pub mod token;

pub use key::{KeyError, SigningKey};
pub use password::{HashParams, HashingError, PasswordHasher};
pub use token::{Claims, TokenError, TokenIssuer, TokenLifetimes, TokenPair, TokenUse};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;

/// Closed set of roles a user can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("role must be one of ADMIN, USER: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
