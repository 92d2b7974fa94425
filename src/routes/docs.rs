use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use super::{applications, auth, health, jobs};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::send_otp,
        auth::verify_otp,
        auth::me,
        auth::complete_profile,
        jobs::create_job,
        jobs::list_jobs,
        jobs::list_company_jobs,
        jobs::get_job,
        jobs::update_job,
        jobs::delete_job,
        jobs::apply,
        jobs::update_application_status,
        applications::list_my_applications,
    ),
    tags((name = "job-portal", description = "Job portal API"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
