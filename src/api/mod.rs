//! HTTP boundary: routing, the bearer gate, and JSON error mapping.

use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span, warn};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

use crate::account::AccountService;

pub mod error;
pub mod gate;
pub mod handlers;
mod openapi;

pub use openapi::{ApiDoc, openapi};

use handlers::{health, login, signup, users};

const REQUEST_ID: &str = "x-request-id";

/// Build the application router.
///
/// `/users` and `/user/:id` sit behind [`gate::authenticate`]; everything else
/// is public.
#[must_use]
pub fn router(accounts: Arc<AccountService>) -> Router {
    let issuer = Arc::clone(accounts.issuer());

    let protected = Router::new()
        .route("/users", get(users::list_users))
        .route("/user/:id", get(users::get_user))
        .route_layer(middleware::from_fn(gate::authenticate));

    Router::new()
        .route("/signup", post(signup::signup))
        .route("/login", post(login::login))
        .route("/health", get(health::health))
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(issuer))
                .layer(Extension(accounts)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn serve(port: u16, accounts: Arc<AccountService>) -> Result<()> {
    let app = router(accounts);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {err}");
                std::future::pending::<()>().await;
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
