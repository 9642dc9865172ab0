//! # Authgate
//!
//! `authgate` is a minimal authentication backend. It registers users, issues
//! signed session tokens, verifies credentials on login, and gates two read
//! endpoints behind role-based authorization.
//!
//! ## Tokens
//!
//! Tokens are ES256 JSON Web Tokens signed with a single process-wide key that
//! is loaded (or generated) once at start-up and never mutated afterwards. Every
//! session gets an access token (24h) and a refresh token (7d); both carry the
//! subject, email and role of the user.
//!
//! ## Passwords
//!
//! Passwords are hashed with Argon2id using a fresh random salt per hash. Only
//! the PHC-encoded hash is stored.
//!
//! ## Authorization
//!
//! Protected routes run behind a bearer-token gate that attaches the decoded
//! claims to the request. Handlers compare the claims' role and subject
//! explicitly: `GET /users` is admin-only, `GET /user/{id}` is self-or-admin.

pub mod account;
pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
