//! Bearer-token gate for protected routes.
//!
//! Runs as `route_layer` middleware: a valid access token puts its [`Claims`]
//! into the request extensions, anything else ends the request with 401.

use axum::{
    extract::{Extension, Request},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::error::unauthorized;
use crate::auth::{Claims, TokenIssuer};

const BEARER: &str = "Bearer";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("authorization header required")]
    Missing,
    #[error("authorization header is not valid ASCII")]
    NotAscii,
    #[error("authorization scheme must be Bearer")]
    Scheme,
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// # Errors
/// Returns [`GateError`] when the header is absent, empty or uses another scheme.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, GateError> {
    let value = headers.get(AUTHORIZATION).ok_or(GateError::Missing)?;
    let value = value.to_str().map_err(|_| GateError::NotAscii)?.trim();
    if value.is_empty() {
        return Err(GateError::Missing);
    }

    let rest = value.strip_prefix(BEARER).ok_or(GateError::Scheme)?;
    // "Bearer " was trimmed down to the bare scheme.
    if rest.is_empty() {
        return Err(GateError::Missing);
    }
    if !rest.starts_with(char::is_whitespace) {
        return Err(GateError::Scheme);
    }

    let token = rest.trim();
    if token.is_empty() {
        return Err(GateError::Missing);
    }
    Ok(token)
}

/// axum middleware guarding `/users` and `/user/:id`.
pub async fn authenticate(
    Extension(issuer): Extension<Arc<TokenIssuer>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims: Claims = match bearer_token(request.headers()) {
        Ok(token) => match issuer.validate_access(token) {
            Ok(claims) => claims,
            Err(err) => {
                warn!("Token validation error: {err}");
                return unauthorized("invalid token");
            }
        },
        Err(err) => {
            debug!("Rejected authorization header: {err}");
            return unauthorized(err.to_string());
        }
    };

    debug!(sub = %claims.sub, role = %claims.role, "request authenticated");
    request.extensions_mut().insert(claims);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    #[test]
    fn bearer_token_extracts_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("Bearer   abc ")), Ok("abc"));
    }

    #[test]
    fn bearer_token_rejects_bad_headers() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(GateError::Missing));
        assert_eq!(bearer_token(&headers("")), Err(GateError::Missing));
        assert_eq!(bearer_token(&headers("Bearer ")), Err(GateError::Missing));
        assert_eq!(bearer_token(&headers("Bearer")), Err(GateError::Missing));
        assert_eq!(bearer_token(&headers("  Bearer \t ")), Err(GateError::Missing));
        assert_eq!(bearer_token(&headers("abc.def.ghi")), Err(GateError::Scheme));
        assert_eq!(bearer_token(&headers("Basic dXNlcg==")), Err(GateError::Scheme));
        assert_eq!(bearer_token(&headers("Bearerabc")), Err(GateError::Scheme));
    }
}
