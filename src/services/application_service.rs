use std::collections::HashMap;

use uuid::Uuid;

use crate::database::DynStore;
use crate::dto::application_dto::{AppliedJobSummary, ApplicationSummary};
use crate::error::{Error, Result};
use crate::models::{
    application::{Application, ApplicationStatus},
    job::JobStatus,
    user::Role,
};
use crate::utils::{time, validation::single_error};

#[derive(Clone)]
pub struct ApplicationService {
    store: DynStore,
}

impl ApplicationService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    pub async fn apply(&self, job_id: Uuid, applicant_id: Uuid, role: Role) -> Result<Application> {
        if role != Role::Applicant {
            return Err(Error::Forbidden(
                "Only applicants can apply to jobs".to_string(),
            ));
        }

        let job = self
            .store
            .find_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
        if job.status != JobStatus::Active {
            return Err(single_error(
                "job",
                "closed",
                "This job is no longer accepting applications",
            )
            .into());
        }

        let application = self
            .store
            .insert_application(Application::pending(job_id, applicant_id, time::now()))
            .await?;
        tracing::info!(job_id = %job_id, applicant_id = %applicant_id, "Application submitted");
        Ok(application)
    }

    /// Ownership is checked before the application lookup, so a non-owner
    /// learns nothing about who applied.
    pub async fn set_status(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        requester_id: Uuid,
        role: Role,
        status: &str,
    ) -> Result<Application> {
        if role != Role::Company {
            return Err(Error::Forbidden(
                "Only companies can review applications".to_string(),
            ));
        }

        let job = self
            .store
            .find_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
        if !job.is_owned_by(requester_id) {
            return Err(Error::Forbidden("You do not own this job".to_string()));
        }

        let status: ApplicationStatus = status.parse().map_err(|_| {
            Error::from(single_error(
                "status",
                "invalid_status",
                "Status must be one of pending, shortlisted, rejected",
            ))
        })?;

        let application = self
            .store
            .update_application_status(job_id, applicant_id, status)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        tracing::info!(
            job_id = %job_id,
            applicant_id = %applicant_id,
            status = status.as_str(),
            "Application status changed"
        );
        Ok(application)
    }

    /// Newest application first. Applications whose job disappeared are skipped.
    pub async fn list_for_applicant(
        &self,
        applicant_id: Uuid,
        role: Role,
    ) -> Result<Vec<ApplicationSummary>> {
        if role != Role::Applicant {
            return Err(Error::Forbidden(
                "Only applicants have applications".to_string(),
            ));
        }

        let mut applications = self.store.list_applications_for_applicant(applicant_id).await?;
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));

        let job_ids: Vec<Uuid> = applications.iter().map(|a| a.job_id).collect();
        let jobs = self.store.find_jobs_by_ids(&job_ids).await?;

        let mut owner_ids: Vec<Uuid> = jobs.iter().map(|j| j.owner_id).collect();
        owner_ids.sort();
        owner_ids.dedup();
        let owners: HashMap<Uuid, _> = self
            .store
            .find_users_by_ids(&owner_ids)
            .await?
            .iter()
            .map(|u| (u.id, u.summary()))
            .collect();
        let jobs: HashMap<Uuid, _> = jobs.into_iter().map(|j| (j.id, j)).collect();

        Ok(applications
            .into_iter()
            .filter_map(|application| {
                let job = jobs.get(&application.job_id)?;
                Some(ApplicationSummary {
                    job: AppliedJobSummary {
                        id: job.id,
                        title: job.title.clone(),
                        location: job.location.clone(),
                        employment_type: job.employment_type,
                        status: job.status,
                        company: owners.get(&job.owner_id).cloned(),
                    },
                    status: application.status,
                    applied_at: application.applied_at,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{JsonFileStore, Store};
    use crate::models::{
        job::{EmploymentType, JobChanges, NewJob},
        user::NewUser,
    };
    use std::sync::Arc;

    struct Fixture {
        store: Arc<JsonFileStore>,
        service: ApplicationService,
        company: Uuid,
        applicant: Uuid,
        job: Uuid,
    }

    async fn user(store: &JsonFileStore, email: &str, role: Role) -> Uuid {
        store
            .insert_user(NewUser {
                email: email.to_string(),
                password_hash: "$argon2id$stub".to_string(),
                role,
                name: email.to_string(),
                company_name: None,
                profile: serde_json::json!({}),
            })
            .await
            .unwrap()
            .id
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(JsonFileStore::in_memory());
        let company = user(&store, "c@x.com", Role::Company).await;
        let applicant = user(&store, "u@x.com", Role::Applicant).await;
        let job = store
            .insert_job(NewJob {
                owner_id: company,
                title: "Intern".to_string(),
                description: "d".to_string(),
                requirements: "r".to_string(),
                location: "Remote".to_string(),
                salary: None,
                employment_type: EmploymentType::Internship,
            })
            .await
            .unwrap()
            .id;
        Fixture {
            service: ApplicationService::new(store.clone()),
            store,
            company,
            applicant,
            job,
        }
    }

    #[tokio::test]
    async fn apply_creates_pending_application_once() {
        let f = fixture().await;
        let app = f
            .service
            .apply(f.job, f.applicant, Role::Applicant)
            .await
            .unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);

        assert!(matches!(
            f.service.apply(f.job, f.applicant, Role::Applicant).await,
            Err(Error::DuplicateApplication)
        ));
    }

    #[tokio::test]
    async fn apply_checks_role_job_and_status() {
        let f = fixture().await;
        assert!(matches!(
            f.service.apply(f.job, f.company, Role::Company).await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            f.service
                .apply(Uuid::new_v4(), f.applicant, Role::Applicant)
                .await,
            Err(Error::NotFound(_))
        ));

        f.store
            .update_job(
                f.job,
                JobChanges {
                    status: Some(JobStatus::Closed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            f.service.apply(f.job, f.applicant, Role::Applicant).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_applies_store_one_application() {
        let f = fixture().await;
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = f.service.clone();
                let (job, applicant) = (f.job, f.applicant);
                tokio::spawn(async move { svc.apply(job, applicant, Role::Applicant).await })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(Error::DuplicateApplication) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(
            f.store
                .list_applications_for_applicant(f.applicant)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn owner_moves_status() {
        let f = fixture().await;
        f.service
            .apply(f.job, f.applicant, Role::Applicant)
            .await
            .unwrap();

        let updated = f
            .service
            .set_status(f.job, f.applicant, f.company, Role::Company, "Shortlisted")
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Shortlisted);

        let back = f
            .service
            .set_status(f.job, f.applicant, f.company, Role::Company, "pending")
            .await
            .unwrap();
        assert_eq!(back.status, ApplicationStatus::Pending);
    }

    #[tokio::test]
    async fn set_status_rejections_follow_check_order() {
        let f = fixture().await;
        let rival = user(&f.store, "r@x.com", Role::Company).await;

        assert!(matches!(
            f.service
                .set_status(f.job, f.applicant, f.applicant, Role::Applicant, "rejected")
                .await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            f.service
                .set_status(Uuid::new_v4(), f.applicant, f.company, Role::Company, "rejected")
                .await,
            Err(Error::NotFound(_))
        ));
        // No application exists yet; a non-owner still only sees Forbidden.
        assert!(matches!(
            f.service
                .set_status(f.job, f.applicant, rival, Role::Company, "rejected")
                .await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            f.service
                .set_status(f.job, f.applicant, f.company, Role::Company, "hired")
                .await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            f.service
                .set_status(f.job, f.applicant, f.company, Role::Company, "rejected")
                .await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn applicant_lists_own_applications_with_company() {
        let f = fixture().await;
        f.service
            .apply(f.job, f.applicant, Role::Applicant)
            .await
            .unwrap();

        let mine = f
            .service
            .list_for_applicant(f.applicant, Role::Applicant)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].job.id, f.job);
        assert_eq!(mine[0].job.title, "Intern");
        assert_eq!(mine[0].status, ApplicationStatus::Pending);
        assert_eq!(mine[0].job.company.as_ref().unwrap().id, f.company);

        assert!(matches!(
            f.service.list_for_applicant(f.company, Role::Company).await,
            Err(Error::Forbidden(_))
        ));
    }
}
