use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    dto::{
        application_dto::{ApplicationResponse, UpdateApplicationStatusPayload},
        job_dto::{CreateJobPayload, JobResponse, UpdateJobPayload},
    },
    error::Result,
    middleware::json::JsonBody,
    services::session_service::SessionClaims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job posted", body = JobResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a company")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    session: SessionClaims,
    JsonBody(payload): JsonBody<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .create(session.user_id, session.role, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    get,
    path = "/jobs",
    responses(
        (status = 200, description = "Active jobs, newest first", body = [JobListing])
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list_active().await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/jobs/company",
    responses(
        (status = 200, description = "The caller's jobs with applicants", body = [OwnerJobView]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a company")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_company_jobs(
    State(state): State<AppState>,
    session: SessionClaims,
) -> Result<impl IntoResponse> {
    let jobs = state
        .job_service
        .list_for_owner(session.user_id, session.role)
        .await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Active job", body = JobListing),
        (status = 404, description = "Job not found or closed")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_active(id).await?;
    Ok(Json(job))
}

#[utoipa::path(
    patch,
    path = "/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = JobResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller does not own the job"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    session: SessionClaims,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .update(id, session.user_id, session.role, payload)
        .await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 204, description = "Job and its applications deleted"),
        (status = 403, description = "Caller does not own the job"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    session: SessionClaims,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .job_service
        .delete(id, session.user_id, session.role)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/jobs/{id}/apply",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Application submitted", body = ApplicationResponse),
        (status = 400, description = "Already applied or job closed"),
        (status = 403, description = "Caller is not an applicant"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    session: SessionClaims,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .apply(id, session.user_id, session.role)
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    patch,
    path = "/jobs/{id}/applications/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Job ID"),
        ("user_id" = Uuid, Path, description = "Applicant ID")
    ),
    request_body = UpdateApplicationStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = ApplicationResponse),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Caller does not own the job"),
        (status = 404, description = "Job or application not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    session: SessionClaims,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
    JsonBody(payload): JsonBody<UpdateApplicationStatusPayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .set_status(id, user_id, session.user_id, session.role, &payload.status)
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}
