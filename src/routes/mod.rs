pub mod applications;
pub mod auth;
pub mod docs;
pub mod health;
pub mod jobs;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::Result;
use crate::middleware::{cors::cors_layer, rate_limit};
use crate::AppState;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Router-level knobs taken from [`Config`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub auth_rps: u32,
    pub trust_proxy_headers: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl HttpSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            auth_rps: config.auth_rps,
            trust_proxy_headers: config.trust_proxy_headers,
            cors_allowed_origins: config.cors_allowed_origins.clone(),
        }
    }
}

/// Full application router. The binary and the integration tests share it.
pub fn build_router(state: AppState, settings: &HttpSettings) -> Result<Router> {
    let base_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json));

    let auth_api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/send-otp", post(auth::send_otp))
        .route("/auth/verify-otp", post(auth::verify_otp))
        .route("/auth/me", get(auth::me))
        .route("/auth/complete-profile", post(auth::complete_profile))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(settings.auth_rps, settings.trust_proxy_headers),
            rate_limit::rps_middleware,
        ));

    let jobs_api = Router::new()
        .route("/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/jobs/company", get(jobs::list_company_jobs))
        .route(
            "/jobs/:id",
            get(jobs::get_job)
                .patch(jobs::update_job)
                .delete(jobs::delete_job),
        )
        .route("/jobs/:id/apply", post(jobs::apply))
        .route(
            "/jobs/:id/applications/:user_id",
            patch(jobs::update_application_status),
        )
        .route("/applications", get(applications::list_my_applications));

    Ok(base_routes
        .merge(auth_api)
        .merge(jobs_api)
        .with_state(state)
        .layer(cors_layer(&settings.cors_allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)))
}
