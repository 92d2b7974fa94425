use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterPayload {
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(alias = "userType")]
    pub role: Role,
    /// Defaults to the local part of the email when missing or blank.
    #[serde(default)]
    #[validate(length(max = 200))]
    pub name: String,
    #[serde(default, alias = "companyName")]
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
    #[serde(default)]
    pub profile: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOtpPayload {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpPayload {
    pub email: String,
    #[serde(alias = "otp")]
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CompleteProfilePayload {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[serde(default, alias = "companyName")]
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
    #[serde(default)]
    pub profile: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub role: Role,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpSentResponse {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// A user as shown to its owner. The password hash never leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub company_name: Option<String>,
    pub profile: JsonValue,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            email: value.email,
            role: value.role,
            name: value.name,
            company_name: value.company_name,
            profile: value.profile,
            email_verified: value.email_verified,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
