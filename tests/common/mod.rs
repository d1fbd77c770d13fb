#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use mathgenius_api::config::{AppConfig, StoreBackend};
use mathgenius_api::database::{MemoryStore, Store};
use mathgenius_api::services::UserService;
use mathgenius_api::validation::account::Signup;
use mathgenius_api::{app, AppState};

pub const ADMIN_EMAIL: &str = "admin@mathgenius.test";
pub const ADMIN_PASSWORD: &str = "admin-secret";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.database.backend = StoreBackend::Memory;
    config.security.jwt_secret = "test-secret".to_string();
    config.security.bcrypt_cost = 4;
    config
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Session token from the `Set-Cookie` header, if the response set one
    pub fn session_token(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|cookie| cookie.strip_prefix("token="))
            .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
            .filter(|token| !token.is_empty())
    }

    pub fn id(&self) -> String {
        self.body["id"].as_str().unwrap_or_default().to_string()
    }
}

/// The full router over a fresh in-memory store, with one admin account
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn Store>,
    pub admin_token: String,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    pub async fn with_store(store: Arc<dyn Store>) -> Result<Self> {
        let config = test_config();
        UserService::new(store.clone(), Arc::new(config.clone()))
            .create_admin(Signup {
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
                name: "Ada Admin".to_string(),
                year_of_birth: 1980,
                is_male: false,
            })
            .await?;

        let router = app(AppState::new(store.clone(), config));
        let mut test_app = Self {
            router,
            store,
            admin_token: String::new(),
        };

        let res = test_app
            .post("/auth/signin", json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }), None)
            .await?;
        test_app.admin_token = res.session_token().context("admin signin set no cookie")?;
        Ok(test_app)
    }

    pub async fn request(&self, method: Method, path: &str, body: Option<Value>, token: Option<&str>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, path, None, token).await
    }

    pub async fn post(&self, path: &str, body: Value, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::POST, path, Some(body), token).await
    }

    pub async fn put(&self, path: &str, body: Value, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::PUT, path, Some(body), token).await
    }

    pub async fn patch(&self, path: &str, body: Value, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::PATCH, path, Some(body), token).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::DELETE, path, None, token).await
    }

    /// Shortcut for admin-authenticated writes that must succeed with 201
    pub async fn create(&self, path: &str, body: Value) -> Result<Value> {
        let res = self.post(path, body, Some(&self.admin_token)).await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "POST {} -> {} {}", path, res.status, res.body);
        Ok(res.body)
    }

    /// Register a regular user and return their session token
    pub async fn signup(&self, email: &str) -> Result<String> {
        let res = self
            .post(
                "/auth/signup",
                json!({
                    "email": email,
                    "password": "learner-pass",
                    "name": "Lea Learner",
                    "yearOfBirth": 2005,
                    "isMale": false,
                }),
                None,
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "signup -> {} {}", res.status, res.body);
        res.session_token().context("signup set no cookie")
    }

    pub async fn subject(&self, name: &str) -> Result<Value> {
        self.create(
            "/subjects",
            json!({ "name": name, "iconUrl": "icons/x.svg", "description": "Numbers and symbols" }),
        )
        .await
    }

    pub async fn topic(&self, name: &str, subject_id: &str, position: i64) -> Result<Value> {
        self.create(
            "/topics",
            json!({
                "name": name,
                "subjectId": subject_id,
                "position": position,
                "difficultyRange": "Beginner",
                "estimatedStudyHours": 2,
            }),
        )
        .await
    }

    pub async fn subtopic(&self, name: &str, topic_id: &str, position: i64) -> Result<Value> {
        self.create(
            "/subtopics",
            json!({
                "name": name,
                "topicId": topic_id,
                "position": position,
                "difficultyScore": 3.5,
                "estimatedStudyMinutes": 45,
            }),
        )
        .await
    }

    pub async fn module(&self, name: &str, subtopic_id: &str, position: i64) -> Result<Value> {
        self.create(
            "/modules",
            json!({
                "name": name,
                "subtopicId": subtopic_id,
                "position": position,
                "moduleType": "practice",
                "xpReward": 50,
                "difficultyLevel": 2,
                "estimatedMinutes": 15,
            }),
        )
        .await
    }

    pub async fn concept(&self, name: &str, subject_id: &str) -> Result<Value> {
        self.create(
            "/concepts",
            json!({
                "name": name,
                "subjectId": subject_id,
                "description": "A core idea",
                "difficultyLevel": 2,
            }),
        )
        .await
    }
}

/// Id strings held in `doc[field]`
pub fn ids(doc: &Value, field: &str) -> Vec<String> {
    doc[field]
        .as_array()
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

pub fn str_of(doc: &Value, field: &str) -> String {
    doc[field].as_str().unwrap_or_default().to_string()
}
