use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    dto::auth_dto::{
        AuthResponse, CompleteProfilePayload, LoginPayload, MessageResponse, OtpSentResponse,
        RegisterPayload, SendOtpPayload, UserResponse, VerifyOtpPayload,
    },
    error::Result,
    middleware::json::JsonBody,
    services::session_service::SessionClaims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account created, session token issued", body = AuthResponse),
        (status = 400, description = "Invalid payload or email already registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterPayload>,
) -> Result<impl IntoResponse> {
    let user = state.credential_service.register(payload).await?;
    let token = state.session_issuer.mint(user.id, user.role)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration successful".to_string(),
            token,
            role: user.role,
            user_id: user.id,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Session token issued", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginPayload>,
) -> Result<impl IntoResponse> {
    let user = state
        .credential_service
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = state.session_issuer.mint(user.id, user.role)?;
    tracing::info!(user_id = %user.id, "Login succeeded");
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        role: user.role,
        user_id: user.id,
    }))
}

#[utoipa::path(
    post,
    path = "/auth/send-otp",
    request_body = SendOtpPayload,
    responses(
        (status = 200, description = "Code sent", body = OtpSentResponse),
        (status = 400, description = "Malformed email"),
        (status = 500, description = "Delivery failed, retry")
    )
)]
#[axum::debug_handler]
pub async fn send_otp(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SendOtpPayload>,
) -> Result<impl IntoResponse> {
    let issued = state.otp_service.issue(&payload.email).await?;
    Ok(Json(OtpSentResponse {
        message: "OTP sent to email".to_string(),
        expires_at: issued.expires_at,
    }))
}

#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    request_body = VerifyOtpPayload,
    responses(
        (status = 200, description = "Code accepted", body = MessageResponse),
        (status = 400, description = "Code expired, missing or wrong")
    )
)]
#[axum::debug_handler]
pub async fn verify_otp(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<VerifyOtpPayload>,
) -> Result<impl IntoResponse> {
    state
        .otp_service
        .verify(&payload.email, &payload.code)
        .await?;
    Ok(Json(MessageResponse::new("OTP verified successfully")))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "The caller's account", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    session: SessionClaims,
) -> Result<impl IntoResponse> {
    let user = state.credential_service.get(session.user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/auth/complete-profile",
    request_body = CompleteProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn complete_profile(
    State(state): State<AppState>,
    session: SessionClaims,
    JsonBody(payload): JsonBody<CompleteProfilePayload>,
) -> Result<impl IntoResponse> {
    let user = state
        .credential_service
        .update_profile(session.user_id, session.role, payload)
        .await?;
    Ok(Json(UserResponse::from(user)))
}
