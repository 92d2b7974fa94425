use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::Store;
use crate::error::{Error, Result};
use crate::models::{
    application::{Application, ApplicationStatus},
    job::{Job, JobChanges, JobStatus, NewJob},
    user::{NewUser, ProfileChanges, User},
};

#[derive(Debug, Clone, Copy)]
enum Collection {
    Users,
    Jobs,
    Applications,
}

impl Collection {
    fn file_name(self) -> &'static str {
        match self {
            Collection::Users => "users.json",
            Collection::Jobs => "jobs.json",
            Collection::Applications => "applications.json",
        }
    }
}

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
}

/// Collections kept in memory and written through to one JSON array per
/// collection. A single lock covers check, mutation and flush, which makes
/// every uniqueness check atomic with its insert.
pub struct JsonFileStore {
    dir: Option<PathBuf>,
    state: Mutex<Collections>,
}

impl JsonFileStore {
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            state: Mutex::new(Collections::default()),
        }
    }

    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;

        let state = Collections {
            users: load(&dir, Collection::Users).await?,
            jobs: load(&dir, Collection::Jobs).await?,
            applications: load(&dir, Collection::Applications).await?,
        };
        tracing::debug!(
            users = state.users.len(),
            jobs = state.jobs.len(),
            applications = state.applications.len(),
            "Loaded JSON collections"
        );

        Ok(Self {
            dir: Some(dir),
            state: Mutex::new(state),
        })
    }

    /// Writes the collection before the caller swaps it into memory, so a
    /// failed write leaves both sides unchanged.
    async fn flush<T: Serialize>(&self, collection: Collection, items: &[T]) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let path = dir.join(collection.file_name());
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(items)?;
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

async fn load<T: DeserializeOwned>(dir: &Path, collection: Collection) -> Result<Vec<T>> {
    let path = dir.join(collection.file_name());
    match tokio::fs::read(&path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
            Error::Store(format!("{} is not a valid collection: {}", path.display(), e))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

fn newest_first(mut jobs: Vec<Job>) -> Vec<Job> {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    jobs
}

#[async_trait]
impl Store for JsonFileStore {
    async fn insert_user(&self, new_user: NewUser) -> Result<User> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.email == new_user.email) {
            return Err(Error::DuplicateIdentity);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            name: new_user.name,
            company_name: new_user.company_name,
            profile: new_user.profile,
            email_verified: false,
            created_at: now,
            updated_at: now,
        };

        let mut users = state.users.clone();
        users.push(user.clone());
        self.flush(Collection::Users, &users).await?;
        state.users = users;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<User>> {
        let mut state = self.state.lock().await;
        let mut users = state.users.clone();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(company_name) = changes.company_name {
            user.company_name = Some(company_name);
        }
        if let Some(profile) = changes.profile {
            user.profile = profile;
        }
        user.updated_at = Utc::now();
        let updated = user.clone();

        self.flush(Collection::Users, &users).await?;
        state.users = users;
        Ok(Some(updated))
    }

    async fn mark_email_verified(&self, email: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let mut users = state.users.clone();
        let Some(user) = users.iter_mut().find(|u| u.email == email) else {
            return Ok(false);
        };
        if user.email_verified {
            return Ok(true);
        }
        user.email_verified = true;
        user.updated_at = Utc::now();

        self.flush(Collection::Users, &users).await?;
        state.users = users;
        Ok(true)
    }

    async fn insert_job(&self, new_job: NewJob) -> Result<Job> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            owner_id: new_job.owner_id,
            title: new_job.title,
            description: new_job.description,
            requirements: new_job.requirements,
            location: new_job.location,
            salary: new_job.salary,
            employment_type: new_job.employment_type,
            status: JobStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let mut jobs = state.jobs.clone();
        jobs.push(job.clone());
        self.flush(Collection::Jobs, &jobs).await?;
        state.jobs = jobs;
        Ok(job)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>> {
        let state = self.state.lock().await;
        Ok(state.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn list_jobs_by_status(&self, status: JobStatus) -> Result<Vec<Job>> {
        let state = self.state.lock().await;
        let jobs = state
            .jobs
            .iter()
            .filter(|j| j.status == status)
            .cloned()
            .collect();
        Ok(newest_first(jobs))
    }

    async fn list_jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>> {
        let state = self.state.lock().await;
        let jobs = state
            .jobs
            .iter()
            .filter(|j| j.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(jobs))
    }

    async fn find_jobs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Job>> {
        let state = self.state.lock().await;
        Ok(state
            .jobs
            .iter()
            .filter(|j| ids.contains(&j.id))
            .cloned()
            .collect())
    }

    async fn update_job(&self, id: Uuid, changes: JobChanges) -> Result<Option<Job>> {
        let mut state = self.state.lock().await;
        let mut jobs = state.jobs.clone();
        let Some(job) = jobs.iter_mut().find(|j| j.id == id) else {
            return Ok(None);
        };
        changes.apply_to(job);
        job.updated_at = Utc::now();
        let updated = job.clone();

        self.flush(Collection::Jobs, &jobs).await?;
        state.jobs = jobs;
        Ok(Some(updated))
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().await;
        if !state.jobs.iter().any(|j| j.id == id) {
            return Ok(false);
        }

        let jobs: Vec<Job> = state.jobs.iter().filter(|j| j.id != id).cloned().collect();
        let applications: Vec<Application> = state
            .applications
            .iter()
            .filter(|a| a.job_id != id)
            .cloned()
            .collect();

        // Applications first: a crash in between leaves an orphan-free job file.
        self.flush(Collection::Applications, &applications).await?;
        state.applications = applications;
        self.flush(Collection::Jobs, &jobs).await?;
        state.jobs = jobs;
        Ok(true)
    }

    async fn insert_application(&self, application: Application) -> Result<Application> {
        let mut state = self.state.lock().await;
        if !state.jobs.iter().any(|j| j.id == application.job_id) {
            return Err(Error::NotFound("Job not found".to_string()));
        }
        if state.applications.iter().any(|a| {
            a.job_id == application.job_id && a.applicant_id == application.applicant_id
        }) {
            return Err(Error::DuplicateApplication);
        }

        let mut applications = state.applications.clone();
        applications.push(application.clone());
        self.flush(Collection::Applications, &applications).await?;
        state.applications = applications;
        Ok(application)
    }

    async fn update_application_status(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let mut state = self.state.lock().await;
        let mut applications = state.applications.clone();
        let Some(application) = applications
            .iter_mut()
            .find(|a| a.job_id == job_id && a.applicant_id == applicant_id)
        else {
            return Ok(None);
        };
        application.status = status;
        application.updated_at = Utc::now();
        let updated = application.clone();

        self.flush(Collection::Applications, &applications).await?;
        state.applications = applications;
        Ok(Some(updated))
    }

    async fn list_applications_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>> {
        let state = self.state.lock().await;
        let mut applications: Vec<Application> = state
            .applications
            .iter()
            .filter(|a| job_ids.contains(&a.job_id))
            .cloned()
            .collect();
        applications.sort_by(|a, b| a.applied_at.cmp(&b.applied_at));
        Ok(applications)
    }

    async fn list_applications_for_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<Application>> {
        let state = self.state.lock().await;
        let mut applications: Vec<Application> = state
            .applications
            .iter()
            .filter(|a| a.applicant_id == applicant_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(applications)
    }
}
