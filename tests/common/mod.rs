#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use job_portal_backend::{
    database::{InMemoryOtpStore, JsonFileStore},
    error::Result,
    routes::{build_router, HttpSettings},
    services::{notification_service::OtpMailer, session_service::SessionIssuer},
    AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789";

/// Keeps every code it is asked to deliver.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl OtpMailer for RecordingMailer {
    async fn send_otp(&self, email: &str, code: &str, _ttl_minutes: i64) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
}

pub fn spawn_app_with_rps(auth_rps: u32) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(
        Arc::new(JsonFileStore::in_memory()),
        Arc::new(InMemoryOtpStore::new()),
        mailer.clone(),
        SessionIssuer::new(TEST_SECRET, chrono::Duration::days(7)),
        10,
        5,
    );
    TestApp {
        router: build_router(
            state,
            &HttpSettings {
                auth_rps,
                trust_proxy_headers: false,
                cors_allowed_origins: vec!["*".to_string()],
            },
        )
        .unwrap(),
        mailer,
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_rps(10_000)
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
        };
        (status, json)
    }

    pub async fn send_raw(&self, method: Method, uri: &str, raw_body: &str) -> (StatusCode, JsonValue) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw_body.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null))
    }

    pub async fn send_with_header(
        &self,
        method: Method,
        uri: &str,
        (name, value): (&str, &str),
        raw_body: &str,
    ) -> (StatusCode, JsonValue) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(name, value)
            .body(Body::from(raw_body.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null))
    }

    /// Registers an account and returns `(token, user_id)`.
    pub async fn register(&self, email: &str, password: &str, role: &str) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": password,
                    "role": role,
                    "name": format!("{} account", role),
                    "company_name": "Acme",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user_id"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_job(&self, token: &str, title: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/jobs",
                Some(token),
                Some(json!({
                    "title": title,
                    "location": "Remote",
                    "description": "d",
                    "requirements": "r",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create job failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }
}
