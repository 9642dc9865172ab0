use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::instrument;

use crate::{
    account::{AccountService, SignupRequest, SignupResponse},
    api::error::{ErrorBody, bad_request},
};

#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = SignupResponse),
        (status = 400, description = "Invalid payload, or email/phone already exists", body = ErrorBody),
        (status = 500, description = "Storage or hashing failure", body = ErrorBody),
    ),
    tag = "auth"
)]
#[instrument(skip(accounts, payload))]
pub async fn signup(
    accounts: Extension<Arc<AccountService>>,
    payload: Option<Json<SignupRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return bad_request("missing or malformed payload");
    };

    match accounts.register(request).await {
        Ok(created) => (StatusCode::OK, Json(created)).into_response(),
        Err(err) => err.into_response(),
    }
}
