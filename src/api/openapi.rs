use utoipa::{
    Modify, OpenApi,
    openapi::{
        Tag,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};

use super::{
    error::ErrorBody,
    handlers::{health, login, signup, users},
};
use crate::{
    account::{LoginRequest, LoginResponse, SignupRequest, SignupResponse, UserView},
    auth::Role,
};

/// Info (title, version, contact, license) comes from Cargo metadata.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        signup::signup,
        login::login,
        users::list_users,
        users::get_user,
    ),
    components(schemas(
        ErrorBody,
        health::Health,
        LoginRequest,
        LoginResponse,
        Role,
        SignupRequest,
        SignupResponse,
        UserView,
    )),
    modifiers(&BearerSecurity)
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Signup and login".to_string());

    let mut users_tag = Tag::new("users");
    users_tag.description = Some("Bearer-protected account reads".to_string());

    let mut health_tag = Tag::new("health");
    health_tag.description = Some("Liveness and storage reachability".to_string());

    doc.tags = Some(vec![auth_tag, users_tag, health_tag]);
    doc
}
