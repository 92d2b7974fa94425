use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    application::ApplicationStatus,
    job::{EmploymentType, Job, JobStatus},
    user::OwnerSummary,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Requirements are required"))]
    pub requirements: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Location is required"))]
    pub location: String,
    pub salary: Option<String>,
    #[serde(default, alias = "type", alias = "jobType")]
    pub employment_type: Option<EmploymentType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub requirements: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(default, alias = "type", alias = "jobType")]
    pub employment_type: Option<EmploymentType>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub salary: Option<String>,
    pub employment_type: EmploymentType,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            owner_id: value.owner_id,
            title: value.title,
            description: value.description,
            requirements: value.requirements,
            location: value.location,
            salary: value.salary,
            employment_type: value.employment_type,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Public listing entry: the job plus its company's names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListing {
    #[serde(flatten)]
    pub job: JobResponse,
    pub company: Option<OwnerSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantEntry {
    /// `None` when the applicant account no longer exists.
    pub applicant: Option<ApplicantSummary>,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A company's own job with everyone who applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerJobView {
    #[serde(flatten)]
    pub job: JobResponse,
    pub applications: Vec<ApplicantEntry>,
}
