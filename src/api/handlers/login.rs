use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::instrument;

use crate::{
    account::{AccountService, LoginRequest, LoginResponse},
    api::error::{ErrorBody, bad_request},
};

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted, fresh token pair issued", body = LoginResponse),
        (status = 400, description = "Missing or malformed payload", body = ErrorBody),
        (status = 401, description = "Invalid email or password", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
    tag = "auth"
)]
#[instrument(skip(accounts, payload))]
pub async fn login(
    accounts: Extension<Arc<AccountService>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return bad_request("missing or malformed payload");
    };

    match accounts.login(request).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(err) => err.into_response(),
    }
}
