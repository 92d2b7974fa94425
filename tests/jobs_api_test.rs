mod common;

use axum::http::{Method, StatusCode};
use common::spawn_app;
use serde_json::json;

#[tokio::test]
async fn company_posts_applicant_applies_company_shortlists() {
    let app = spawn_app();
    let (tc, company_id) = app.register("c@x.com", "secret1", "company").await;
    let job_id = app.create_job(&tc, "Intern").await;

    let (status, jobs) = app.send(Method::GET, "/jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs[0]["id"], job_id.as_str());
    assert_eq!(jobs[0]["employment_type"], "internship");
    assert_eq!(jobs[0]["company"]["id"], company_id.as_str());
    assert!(jobs[0]["company"].get("email").is_none());

    let (tu, user_id) = app.register("u@x.com", "secret1", "applicant").await;
    let apply_uri = format!("/jobs/{}/apply", job_id);

    let (status, body) = app.send(Method::POST, &apply_uri, Some(&tu), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");

    let (status, body) = app.send(Method::POST, &apply_uri, Some(&tu), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already applied"));

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/jobs/{}/applications/{}", job_id, user_id),
            Some(&tc),
            Some(json!({ "status": "shortlisted" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "shortlisted");

    let (status, mine) = app
        .send(Method::GET, "/applications", Some(&tu), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["job"]["id"], job_id.as_str());
    assert_eq!(mine[0]["status"], "shortlisted");

    let (status, owned) = app.send(Method::GET, "/jobs/company", Some(&tc), None).await;
    assert_eq!(status, StatusCode::OK);
    let applicants = owned[0]["applications"].as_array().unwrap();
    assert_eq!(applicants.len(), 1);
    assert_eq!(applicants[0]["applicant"]["email"], "u@x.com");
}

#[tokio::test]
async fn roles_are_enforced_on_every_gated_route() {
    let app = spawn_app();
    let (tc, _) = app.register("c@x.com", "secret1", "company").await;
    let (tu, user_id) = app.register("u@x.com", "secret1", "applicant").await;
    let job_id = app.create_job(&tc, "Intern").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/jobs",
            Some(&tu),
            Some(json!({ "title": "x", "location": "y", "description": "d", "requirements": "r" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::GET, "/jobs/company", Some(&tu), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/jobs/{}/applications/{}", job_id, user_id),
            Some(&tu),
            Some(json!({ "status": "rejected" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::POST, &format!("/jobs/{}/apply", job_id), Some(&tc), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::GET, "/applications", Some(&tc), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::POST, &format!("/jobs/{}/apply", job_id), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_owner_company_is_forbidden_even_without_application() {
    let app = spawn_app();
    let (tc, _) = app.register("c@x.com", "secret1", "company").await;
    let (rival, _) = app.register("r@x.com", "secret1", "company").await;
    let (_, user_id) = app.register("u@x.com", "secret1", "applicant").await;
    let job_id = app.create_job(&tc, "Intern").await;

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/jobs/{}/applications/{}", job_id, user_id),
            Some(&rival),
            Some(json!({ "status": "shortlisted" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/jobs/{}", job_id),
            Some(&rival),
            Some(json!({ "title": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/jobs/{}/applications/{}", job_id, user_id),
            Some(&tc),
            Some(json!({ "status": "shortlisted" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_status_and_blank_fields_are_bad_requests() {
    let app = spawn_app();
    let (tc, _) = app.register("c@x.com", "secret1", "company").await;
    let (tu, user_id) = app.register("u@x.com", "secret1", "applicant").await;
    let job_id = app.create_job(&tc, "Intern").await;
    app.send(Method::POST, &format!("/jobs/{}/apply", job_id), Some(&tu), None)
        .await;

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/jobs/{}/applications/{}", job_id, user_id),
            Some(&tc),
            Some(json!({ "status": "hired" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/jobs",
            Some(&tc),
            Some(json!({ "title": "  ", "location": "Remote", "description": "d", "requirements": "r" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn closed_jobs_vanish_and_refuse_applications() {
    let app = spawn_app();
    let (tc, _) = app.register("c@x.com", "secret1", "company").await;
    let (tu, _) = app.register("u@x.com", "secret1", "applicant").await;
    let job_id = app.create_job(&tc, "Intern").await;

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/jobs/{}", job_id),
            Some(&tc),
            Some(json!({ "status": "closed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");

    let (_, jobs) = app.send(Method::GET, "/jobs", None, None).await;
    assert!(jobs.as_array().unwrap().is_empty());

    let (status, _) = app
        .send(Method::GET, &format!("/jobs/{}", job_id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::POST, &format!("/jobs/{}/apply", job_id), Some(&tu), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_deletes_job_with_its_applications() {
    let app = spawn_app();
    let (tc, _) = app.register("c@x.com", "secret1", "company").await;
    let (tu, _) = app.register("u@x.com", "secret1", "applicant").await;
    let job_id = app.create_job(&tc, "Intern").await;
    app.send(Method::POST, &format!("/jobs/{}/apply", job_id), Some(&tu), None)
        .await;

    let (status, _) = app
        .send(Method::DELETE, &format!("/jobs/{}", job_id), Some(&tc), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(Method::GET, &format!("/jobs/{}", job_id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, mine) = app.send(Method::GET, "/applications", Some(&tu), None).await;
    assert!(mine.as_array().unwrap().is_empty());

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/jobs/{}/apply", uuid::Uuid::new_v4()),
            Some(&tu),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
