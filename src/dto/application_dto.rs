use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    application::{Application, ApplicationStatus},
    job::{EmploymentType, JobStatus},
    user::OwnerSummary,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateApplicationStatusPayload {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(value: Application) -> Self {
        Self {
            job_id: value.job_id,
            applicant_id: value.applicant_id,
            status: value.status,
            applied_at: value.applied_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedJobSummary {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub employment_type: EmploymentType,
    pub status: JobStatus,
    pub company: Option<OwnerSummary>,
}

/// One row of an applicant's "my applications" page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub job: AppliedJobSummary,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}
