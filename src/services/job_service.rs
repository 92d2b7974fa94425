use std::collections::HashMap;

use uuid::Uuid;
use validator::Validate;

use crate::database::DynStore;
use crate::dto::job_dto::{
    ApplicantEntry, ApplicantSummary, CreateJobPayload, JobListing, OwnerJobView, UpdateJobPayload,
};
use crate::error::{Error, Result};
use crate::models::{
    job::{Job, JobChanges, JobStatus, NewJob},
    user::{OwnerSummary, Role},
};
use crate::utils::validation::{is_blank, single_error};

#[derive(Clone)]
pub struct JobService {
    store: DynStore,
}

fn require_company(role: Role, action: &str) -> Result<()> {
    match role {
        Role::Company => Ok(()),
        Role::Applicant => Err(Error::Forbidden(format!("Only companies can {}", action))),
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl JobService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        role: Role,
        payload: CreateJobPayload,
    ) -> Result<Job> {
        require_company(role, "create jobs")?;
        payload.validate()?;
        for (field, value) in [
            ("title", &payload.title),
            ("description", &payload.description),
            ("requirements", &payload.requirements),
            ("location", &payload.location),
        ] {
            if is_blank(value) {
                return Err(single_error(field, "required", "This field is required").into());
            }
        }

        let job = self
            .store
            .insert_job(NewJob {
                owner_id,
                title: payload.title.trim().to_string(),
                description: payload.description.trim().to_string(),
                requirements: payload.requirements.trim().to_string(),
                location: payload.location.trim().to_string(),
                salary: trimmed(payload.salary).filter(|s| !s.is_empty()),
                employment_type: payload.employment_type.unwrap_or_default(),
            })
            .await?;

        tracing::info!(job_id = %job.id, owner_id = %owner_id, "Job created");
        Ok(job)
    }

    async fn owner_summaries(&self, jobs: &[Job]) -> Result<HashMap<Uuid, OwnerSummary>> {
        let mut owner_ids: Vec<Uuid> = jobs.iter().map(|j| j.owner_id).collect();
        owner_ids.sort();
        owner_ids.dedup();
        let owners = self.store.find_users_by_ids(&owner_ids).await?;
        Ok(owners.iter().map(|u| (u.id, u.summary())).collect())
    }

    pub async fn list_active(&self) -> Result<Vec<JobListing>> {
        let jobs = self.store.list_jobs_by_status(JobStatus::Active).await?;
        let owners = self.owner_summaries(&jobs).await?;
        Ok(jobs
            .into_iter()
            .map(|job| JobListing {
                company: owners.get(&job.owner_id).cloned(),
                job: job.into(),
            })
            .collect())
    }

    pub async fn get_active(&self, job_id: Uuid) -> Result<JobListing> {
        let job = self
            .store
            .find_job(job_id)
            .await?
            .filter(|j| j.status == JobStatus::Active)
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
        let owners = self.owner_summaries(std::slice::from_ref(&job)).await?;
        Ok(JobListing {
            company: owners.get(&job.owner_id).cloned(),
            job: job.into(),
        })
    }

    pub async fn list_for_owner(&self, owner_id: Uuid, role: Role) -> Result<Vec<OwnerJobView>> {
        require_company(role, "view their postings")?;
        let jobs = self.store.list_jobs_by_owner(owner_id).await?;
        let job_ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();
        let applications = self.store.list_applications_for_jobs(&job_ids).await?;

        let mut applicant_ids: Vec<Uuid> = applications.iter().map(|a| a.applicant_id).collect();
        applicant_ids.sort();
        applicant_ids.dedup();
        let applicants: HashMap<Uuid, ApplicantSummary> = self
            .store
            .find_users_by_ids(&applicant_ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    ApplicantSummary {
                        id: u.id,
                        name: u.name,
                        email: u.email,
                    },
                )
            })
            .collect();

        let mut by_job: HashMap<Uuid, Vec<ApplicantEntry>> = HashMap::new();
        for application in applications {
            by_job
                .entry(application.job_id)
                .or_default()
                .push(ApplicantEntry {
                    applicant: applicants.get(&application.applicant_id).cloned(),
                    applicant_id: application.applicant_id,
                    status: application.status,
                    applied_at: application.applied_at,
                    updated_at: application.updated_at,
                });
        }

        Ok(jobs
            .into_iter()
            .map(|job| OwnerJobView {
                applications: by_job.remove(&job.id).unwrap_or_default(),
                job: job.into(),
            })
            .collect())
    }

    /// Loads a job and checks that `requester_id` is a company owning it.
    async fn owned_job(&self, job_id: Uuid, requester_id: Uuid, role: Role) -> Result<Job> {
        require_company(role, "manage jobs")?;
        let job = self
            .store
            .find_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
        if !job.is_owned_by(requester_id) {
            return Err(Error::Forbidden("You do not own this job".to_string()));
        }
        Ok(job)
    }

    pub async fn update(
        &self,
        job_id: Uuid,
        requester_id: Uuid,
        role: Role,
        payload: UpdateJobPayload,
    ) -> Result<Job> {
        self.owned_job(job_id, requester_id, role).await?;
        payload.validate()?;
        for (field, value) in [
            ("title", &payload.title),
            ("description", &payload.description),
            ("requirements", &payload.requirements),
            ("location", &payload.location),
        ] {
            if value.as_deref().is_some_and(is_blank) {
                return Err(single_error(field, "required", "This field cannot be blank").into());
            }
        }

        let changes = JobChanges {
            title: trimmed(payload.title),
            description: trimmed(payload.description),
            requirements: trimmed(payload.requirements),
            location: trimmed(payload.location),
            salary: trimmed(payload.salary),
            employment_type: payload.employment_type,
            status: payload.status,
        };

        let job = self
            .store
            .update_job(job_id, changes)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
        tracing::info!(job_id = %job.id, status = job.status.as_str(), "Job updated");
        Ok(job)
    }

    pub async fn delete(&self, job_id: Uuid, requester_id: Uuid, role: Role) -> Result<()> {
        self.owned_job(job_id, requester_id, role).await?;
        if !self.store.delete_job(job_id).await? {
            return Err(Error::NotFound("Job not found".to_string()));
        }
        tracing::info!(job_id = %job_id, "Job deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{JsonFileStore, Store};
    use crate::models::{application::Application, job::EmploymentType, user::NewUser};
    use chrono::Utc;
    use std::sync::Arc;

    async fn seed_user(store: &JsonFileStore, email: &str, role: Role) -> Uuid {
        store
            .insert_user(NewUser {
                email: email.to_string(),
                password_hash: "$argon2id$stub".to_string(),
                role,
                name: format!("{} name", email),
                company_name: (role == Role::Company).then(|| "Acme".to_string()),
                profile: serde_json::json!({}),
            })
            .await
            .unwrap()
            .id
    }

    fn intern_job() -> CreateJobPayload {
        CreateJobPayload {
            title: "Intern".to_string(),
            description: "d".to_string(),
            requirements: "r".to_string(),
            location: "Remote".to_string(),
            salary: None,
            employment_type: None,
        }
    }

    async fn setup() -> (Arc<JsonFileStore>, JobService, Uuid) {
        let store = Arc::new(JsonFileStore::in_memory());
        let company = seed_user(&store, "c@x.com", Role::Company).await;
        let service = JobService::new(store.clone());
        (store, service, company)
    }

    #[tokio::test]
    async fn company_creates_active_job() {
        let (_, svc, company) = setup().await;
        let job = svc.create(company, Role::Company, intern_job()).await.unwrap();
        assert_eq!(job.status, JobStatus::Active);
        assert_eq!(job.owner_id, company);
        assert_eq!(job.employment_type, EmploymentType::Internship);
    }

    #[tokio::test]
    async fn applicants_cannot_create_or_list_owned_jobs() {
        let (_, svc, _) = setup().await;
        let someone = Uuid::new_v4();
        assert!(matches!(
            svc.create(someone, Role::Applicant, intern_job()).await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            svc.list_for_owner(someone, Role::Applicant).await,
            Err(Error::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn blank_required_fields_are_rejected() {
        let (_, svc, company) = setup().await;
        let mut payload = intern_job();
        payload.location = "   ".to_string();
        assert!(matches!(
            svc.create(company, Role::Company, payload).await,
            Err(Error::Validation(_))
        ));

        let mut payload = intern_job();
        payload.title = String::new();
        assert!(matches!(
            svc.create(company, Role::Company, payload).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn active_listing_carries_owner_names_only() {
        let (_, svc, company) = setup().await;
        let job = svc.create(company, Role::Company, intern_job()).await.unwrap();

        let listed = svc.list_active().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].job.id, job.id);
        let owner = listed[0].company.clone().unwrap();
        assert_eq!(owner.company_name.as_deref(), Some("Acme"));

        let json = serde_json::to_value(&listed[0]).unwrap();
        assert!(json["company"].get("email").is_none());
        assert!(json["company"].get("password_hash").is_none());
        assert_eq!(json["title"], "Intern");
    }

    #[tokio::test]
    async fn closed_jobs_leave_the_public_listing() {
        let (_, svc, company) = setup().await;
        let job = svc.create(company, Role::Company, intern_job()).await.unwrap();
        let closing = UpdateJobPayload {
            status: Some(JobStatus::Closed),
            ..Default::default()
        };
        svc.update(job.id, company, Role::Company, closing).await.unwrap();

        assert!(svc.list_active().await.unwrap().is_empty());
        assert!(matches!(svc.get_active(job.id).await, Err(Error::NotFound(_))));
        assert_eq!(svc.list_for_owner(company, Role::Company).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn only_the_owner_may_update_or_delete() {
        let (store, svc, company) = setup().await;
        let rival = seed_user(&store, "r@x.com", Role::Company).await;
        let job = svc.create(company, Role::Company, intern_job()).await.unwrap();

        let edit = UpdateJobPayload {
            title: Some("Senior Intern".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(job.id, rival, Role::Company, edit.clone()).await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            svc.delete(job.id, rival, Role::Company).await,
            Err(Error::Forbidden(_))
        ));

        let updated = svc.update(job.id, company, Role::Company, edit).await.unwrap();
        assert_eq!(updated.title, "Senior Intern");
        svc.delete(job.id, company, Role::Company).await.unwrap();
        assert!(matches!(
            svc.delete(job.id, company, Role::Company).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn owner_view_includes_applicant_detail() {
        let (store, svc, company) = setup().await;
        let applicant = seed_user(&store, "u@x.com", Role::Applicant).await;
        let job = svc.create(company, Role::Company, intern_job()).await.unwrap();
        store
            .insert_application(Application::pending(job.id, applicant, Utc::now()))
            .await
            .unwrap();

        let views = svc.list_for_owner(company, Role::Company).await.unwrap();
        assert_eq!(views.len(), 1);
        let entry = &views[0].applications[0];
        assert_eq!(entry.applicant_id, applicant);
        assert_eq!(entry.applicant.as_ref().unwrap().email, "u@x.com");
    }
}
