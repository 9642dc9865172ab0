//! Request/response types for account endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{auth::Role, store::UserRecord};

/// Signup body. Fields are optional so missing ones surface as validation errors.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default, Clone)]
pub struct SignupRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = Option<String>, format = Password)]
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[schema(example = "USER")]
    pub role: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default, Clone)]
pub struct LoginRequest {
    pub email: Option<String>,
    #[schema(value_type = Option<String>, format = Password)]
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub user: UserView,
    pub token: String,
    pub refresh_token: String,
}

/// Public shape of an account; never carries the password hash or tokens.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserView {
    fn from(record: UserRecord) -> Self {
        Self {
            user_id: record.user_id.to_string(),
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            phone: record.phone,
            role: record.role,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
