use axum::{extract::State, response::IntoResponse, Json};

use crate::{error::Result, services::session_service::SessionClaims, AppState};

#[utoipa::path(
    get,
    path = "/applications",
    responses(
        (status = 200, description = "The caller's applications, newest first", body = [ApplicationSummary]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an applicant")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    session: SessionClaims,
) -> Result<impl IntoResponse> {
    let applications = state
        .application_service
        .list_for_applicant(session.user_id, session.role)
        .await?;
    Ok(Json(applications))
}
