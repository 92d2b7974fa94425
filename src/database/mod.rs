//! Persistence for users, jobs and applications.
//!
//! Every engine implements [`Store`]. Uniqueness (user email, one application
//! per job and applicant) is enforced by the engine itself so that two
//! concurrent inserts can never both succeed.

pub mod file_store;
pub mod otp_store;
pub mod pool;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::{Config, StorageBackend};
use crate::error::{Error, Result};
use crate::models::{
    application::{Application, ApplicationStatus},
    job::{Job, JobChanges, JobStatus, NewJob},
    user::{NewUser, ProfileChanges, User},
};

pub use file_store::JsonFileStore;
pub use otp_store::{InMemoryOtpStore, OtpStore, PgOtpStore};
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with [`Error::DuplicateIdentity`] when the email is taken.
    async fn insert_user(&self, new_user: NewUser) -> Result<User>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>>;
    async fn update_user_profile(&self, id: Uuid, changes: ProfileChanges)
        -> Result<Option<User>>;
    /// Returns whether a user with that email existed.
    async fn mark_email_verified(&self, email: &str) -> Result<bool>;

    async fn insert_job(&self, new_job: NewJob) -> Result<Job>;
    async fn find_job(&self, id: Uuid) -> Result<Option<Job>>;
    /// Newest first.
    async fn list_jobs_by_status(&self, status: JobStatus) -> Result<Vec<Job>>;
    /// Newest first.
    async fn list_jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>>;
    async fn find_jobs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Job>>;
    async fn update_job(&self, id: Uuid, changes: JobChanges) -> Result<Option<Job>>;
    /// Removes the job together with its applications.
    async fn delete_job(&self, id: Uuid) -> Result<bool>;

    /// Fails with [`Error::DuplicateApplication`] when the pair already exists
    /// and [`Error::NotFound`] when the job is gone.
    async fn insert_application(&self, application: Application) -> Result<Application>;
    async fn update_application_status(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>>;
    async fn list_applications_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>>;
    async fn list_applications_for_applicant(&self, applicant_id: Uuid)
        -> Result<Vec<Application>>;
}

pub type DynStore = Arc<dyn Store>;
pub type DynOtpStore = Arc<dyn OtpStore>;

pub struct Persistence {
    pub store: DynStore,
    pub otp_store: DynOtpStore,
}

/// Builds the engines selected by `STORAGE_BACKEND`. Postgres also holds the
/// OTP table; the other engines keep codes in process memory.
pub async fn connect(config: &Config) -> Result<Persistence> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                Error::Config("DATABASE_URL is required for the postgres backend".to_string())
            })?;
            let pool = pool::create_pool(url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Using PostgreSQL storage");
            Ok(Persistence {
                store: Arc::new(PgStore::new(pool.clone())),
                otp_store: Arc::new(PgOtpStore::new(pool)),
            })
        }
        StorageBackend::File => {
            let store = JsonFileStore::open(&config.data_dir).await?;
            tracing::info!(data_dir = %config.data_dir.display(), "Using JSON file storage");
            Ok(Persistence {
                store: Arc::new(store),
                otp_store: Arc::new(InMemoryOtpStore::new()),
            })
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            Ok(Persistence {
                store: Arc::new(JsonFileStore::in_memory()),
                otp_store: Arc::new(InMemoryOtpStore::new()),
            })
        }
    }
}
