use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{Error, Result};
use crate::services::session_service::SessionClaims;
use crate::AppState;

/// Pulls the raw token out of `Authorization: Bearer <token>`.
///
/// `Ok(None)` when the header is absent. A header with another scheme is an
/// invalid token, not a missing one.
pub fn bearer_token(parts: &Parts) -> Result<Option<&str>> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| Error::TokenInvalid)?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or(Error::TokenInvalid)?;
    Ok(Some(token))
}

/// Handlers that take `SessionClaims` only run for a valid session.
#[axum::async_trait]
impl FromRequestParts<AppState> for SessionClaims {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(parts)?;
        state.session_issuer.validate(token)
    }
}
