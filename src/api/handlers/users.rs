//! Authenticated reads. The gate has already validated the token; these
//! handlers only decide whether its claims may see the requested data.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::{
    account::{AccountService, UserView},
    api::error::{ErrorBody, unauthorized},
    auth::Claims,
};

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All accounts", body = [UserView]),
        (status = 401, description = "Missing or invalid token, or caller is not an admin", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all, fields(sub = %claims.sub))]
pub async fn list_users(
    Extension(claims): Extension<Claims>,
    accounts: Extension<Arc<AccountService>>,
) -> Response {
    if !claims.is_admin() {
        warn!("non-admin attempted to list users");
        return unauthorized("unauthorized to access this resource");
    }

    match accounts.list_users().await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "The account", body = UserView),
        (status = 401, description = "Missing or invalid token, or caller is neither owner nor admin", body = ErrorBody),
        (status = 404, description = "No such account", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all, fields(sub = %claims.sub, user_id = %id))]
pub async fn get_user(
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    accounts: Extension<Arc<AccountService>>,
) -> Response {
    let id = id.trim();
    if !claims.can_read(id) {
        warn!("caller may not read this account");
        return unauthorized("unauthorized to access this resource");
    }

    match accounts.get_user(id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}
