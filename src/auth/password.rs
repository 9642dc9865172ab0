//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so the
//! salt and cost factors travel with the hash and verification needs no other
//! state. The work factor is tunable through [`HashParams`].

use argon2::{
    Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version,
    password_hash::{self, SaltString},
};
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;
use thiserror::Error;
use tracing::warn;

const SALT_LEN: usize = 16;

/// Hashed once per hasher so lookups that miss still pay for a verification.
const DECOY_SECRET: &str = "authgate-decoy-credential";

pub const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
pub const DEFAULT_ITERATIONS: u32 = 2;
pub const DEFAULT_PARALLELISM: u32 = 1;

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("invalid argon2 parameters: {0}")]
    Params(String),
    #[error("failed to gather salt entropy")]
    Entropy,
    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Argon2id cost factors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

/// PHC-encoded Argon2id hash of a credential.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for PasswordHash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    params: HashParams,
    rng: SystemRandom,
    decoy: PasswordHash,
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Build a hasher with the given work factor.
    ///
    /// # Errors
    /// Returns `HashingError::Params` if argon2 rejects the cost factors.
    pub fn new(params: HashParams) -> Result<Self, HashingError> {
        let argon_params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| HashingError::Params(e.to_string()))?;

        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params),
            params,
            rng: SystemRandom::new(),
            decoy: PasswordHash(String::new()),
        };
        hasher.decoy = hasher.hash(DECOY_SECRET)?;
        Ok(hasher)
    }

    #[must_use]
    pub fn params(&self) -> HashParams {
        self.params
    }

    /// Hash a secret with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error only if entropy cannot be gathered or argon2 fails.
    pub fn hash(&self, secret: &str) -> Result<PasswordHash, HashingError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        self.rng
            .fill(&mut salt_bytes)
            .map_err(|_| HashingError::Entropy)?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e: password_hash::Error| HashingError::Hash(e.to_string()))?;

        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| PasswordHash(hash.to_string()))
            .map_err(|e| HashingError::Hash(e.to_string()))
    }

    /// Verify a secret against a stored hash using the hash's embedded salt and cost.
    ///
    /// A wrong secret and an unparsable hash both return `false`.
    #[must_use]
    pub fn verify(&self, secret: &str, hash: &PasswordHash) -> bool {
        let parsed = match password_hash::PasswordHash::new(hash.as_str()) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("Stored password hash is not a valid PHC string: {err}");
                return false;
            }
        };

        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }

    /// Run a full verification for a credential with no stored hash.
    ///
    /// Costs the same as [`Self::verify`] with the configured params and
    /// always returns `false`, so a missing account is not faster to reject.
    #[must_use]
    pub fn verify_missing(&self, secret: &str) -> bool {
        let _ = self.verify(secret, &self.decoy);
        false
    }
}
