pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::{DynOtpStore, DynStore, Persistence};
use crate::error::Result;
use crate::services::{
    application_service::ApplicationService, credential_service::CredentialService,
    job_service::JobService, notification_service::OtpMailer, otp_service::OtpService,
    session_service::SessionIssuer,
};

#[derive(Clone)]
pub struct AppState {
    pub session_issuer: SessionIssuer,
    pub credential_service: CredentialService,
    pub otp_service: OtpService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
}

impl AppState {
    pub fn new(
        store: DynStore,
        otp_store: DynOtpStore,
        mailer: Arc<dyn OtpMailer>,
        session_issuer: SessionIssuer,
        otp_ttl_minutes: i64,
        otp_max_attempts: u32,
    ) -> Self {
        let credential_service = CredentialService::new(store.clone());
        let otp_service = OtpService::new(
            otp_store,
            store.clone(),
            mailer,
            otp_ttl_minutes,
            otp_max_attempts,
        );
        let job_service = JobService::new(store.clone());
        let application_service = ApplicationService::new(store);

        Self {
            session_issuer,
            credential_service,
            otp_service,
            job_service,
            application_service,
        }
    }

    pub fn from_config(config: &Config, persistence: Persistence) -> Result<Self> {
        let mailer = services::notification_service::mailer_from_config(config)?;
        let session_issuer = SessionIssuer::new(
            &config.jwt_secret,
            chrono::Duration::days(config.token_ttl_days),
        );
        Ok(Self::new(
            persistence.store,
            persistence.otp_store,
            mailer,
            session_issuer,
            config.otp_ttl_minutes,
            config.otp_max_attempts,
        ))
    }
}
