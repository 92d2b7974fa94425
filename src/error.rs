use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("An account with this email already exists")]
    DuplicateIdentity,

    #[error("You have already applied for this job")]
    DuplicateApplication,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing bearer token")]
    TokenMissing,

    #[error("Invalid or expired token")]
    TokenInvalid,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("OTP expired or invalid")]
    OtpExpiredOrMissing,

    #[error("Invalid OTP")]
    OtpMismatch,

    #[error("Failed to deliver OTP: {0}")]
    DeliveryFailed(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::DuplicateIdentity | Error::DuplicateApplication => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Error::OtpExpiredOrMissing | Error::OtpMismatch => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Error::InvalidCredentials | Error::TokenMissing | Error::TokenInvalid => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::DeliveryFailed(ref reason) => {
                tracing::warn!(%reason, "OTP delivery failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send OTP, please try again".to_string(),
                )
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Error::Store(err.to_string())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("background task failed: {}", err))
    }
}
