use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::Store;
use crate::error::{Error, Result};
use crate::models::{
    application::{Application, ApplicationStatus},
    job::{Job, JobChanges, JobStatus, NewJob},
    user::{NewUser, ProfileChanges, User},
};

const USER_COLUMNS: &str = "id, email, password_hash, role, name, company_name, profile, email_verified, created_at, updated_at";
const JOB_COLUMNS: &str = "id, owner_id, title, description, requirements, location, salary, employment_type, status, created_at, updated_at";
const APPLICATION_COLUMNS: &str = "job_id, applicant_id, status, applied_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    name: String,
    company_name: Option<String>,
    profile: JsonValue,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(Error::Store)?,
            name: row.name,
            company_name: row.company_name,
            profile: row.profile,
            email_verified: row.email_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct JobRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: String,
    requirements: String,
    location: String,
    salary: Option<String>,
    employment_type: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = Error;

    fn try_from(row: JobRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            requirements: row.requirements,
            location: row.location,
            salary: row.salary,
            employment_type: row.employment_type.parse().map_err(Error::Store)?,
            status: row.status.parse().map_err(Error::Store)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ApplicationRow {
    job_id: Uuid,
    applicant_id: Uuid,
    status: String,
    applied_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = Error;

    fn try_from(row: ApplicationRow) -> Result<Self> {
        Ok(Self {
            job_id: row.job_id,
            applicant_id: row.applicant_id,
            status: row.status.parse().map_err(Error::Store)?,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, new_user: NewUser) -> Result<User> {
        let query = format!(
            "INSERT INTO users (id, email, password_hash, role, name, company_name, profile)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(new_user.role.as_str())
            .bind(&new_user.name)
            .bind(&new_user.company_name)
            .bind(&new_user.profile)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::DuplicateIdentity
                } else {
                    Error::from(e)
                }
            })?;
        row.try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<User>> {
        let query = format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 company_name = COALESCE($3, company_name),
                 profile = COALESCE($4, profile),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(changes.name)
            .bind(changes.company_name)
            .bind(changes.profile)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn mark_email_verified(&self, email: &str) -> Result<bool> {
        let res = sqlx::query(
            "UPDATE users SET email_verified = TRUE, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_job(&self, new_job: NewJob) -> Result<Job> {
        let query = format!(
            "INSERT INTO jobs (id, owner_id, title, description, requirements, location, salary, employment_type, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active')
             RETURNING {}",
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(Uuid::new_v4())
            .bind(new_job.owner_id)
            .bind(&new_job.title)
            .bind(&new_job.description)
            .bind(&new_job.requirements)
            .bind(&new_job.location)
            .bind(&new_job.salary)
            .bind(new_job.employment_type.as_str())
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>> {
        let query = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Job::try_from).transpose()
    }

    async fn list_jobs_by_status(&self, status: JobStatus) -> Result<Vec<Job>> {
        let query = format!(
            "SELECT {} FROM jobs WHERE status = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobRow>(&query)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn list_jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>> {
        let query = format!(
            "SELECT {} FROM jobs WHERE owner_id = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobRow>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn find_jobs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Job>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {} FROM jobs WHERE id = ANY($1)", JOB_COLUMNS);
        let rows = sqlx::query_as::<_, JobRow>(&query)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_job(&self, id: Uuid, changes: JobChanges) -> Result<Option<Job>> {
        let query = format!(
            "UPDATE jobs
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 requirements = COALESCE($4, requirements),
                 location = COALESCE($5, location),
                 salary = COALESCE($6, salary),
                 employment_type = COALESCE($7, employment_type),
                 status = COALESCE($8, status),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.requirements)
            .bind(changes.location)
            .bind(changes.salary)
            .bind(changes.employment_type.map(|t| t.as_str()))
            .bind(changes.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?;
        row.map(Job::try_from).transpose()
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_application(&self, application: Application) -> Result<Application> {
        let query = format!(
            "INSERT INTO applications (job_id, applicant_id, status, applied_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            APPLICATION_COLUMNS
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&query)
            .bind(application.job_id)
            .bind(application.applicant_id)
            .bind(application.status.as_str())
            .bind(application.applied_at)
            .bind(application.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::DuplicateApplication
                } else if is_foreign_key_violation(&e) {
                    Error::NotFound("Job not found".to_string())
                } else {
                    Error::from(e)
                }
            })?;
        row.try_into()
    }

    async fn update_application_status(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let query = format!(
            "UPDATE applications SET status = $3, updated_at = NOW()
             WHERE job_id = $1 AND applicant_id = $2
             RETURNING {}",
            APPLICATION_COLUMNS
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&query)
            .bind(job_id)
            .bind(applicant_id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Application::try_from).transpose()
    }

    async fn list_applications_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {} FROM applications WHERE job_id = ANY($1) ORDER BY applied_at ASC",
            APPLICATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&query)
            .bind(job_ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn list_applications_for_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE applicant_id = $1 ORDER BY applied_at DESC",
            APPLICATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&query)
            .bind(applicant_id)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }
}
