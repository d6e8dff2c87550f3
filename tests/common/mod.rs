#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use recipebox::api::AppState;
use recipebox::config::Config;
use recipebox::state::SharedState;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "testpass123";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// Each app gets its own SQLite file and images directory.
pub async fn spawn_app() -> TestApp {
    let dir = std::env::temp_dir().join(format!("recipebox-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", dir.join("test.db").display());
    config.general.images_path = dir.join("images").display().to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let shared = Arc::new(
        SharedState::new(config)
            .await
            .expect("Failed to create shared state"),
    );
    let state = recipebox::api::create_app_state(shared, None);
    let router = recipebox::api::router(state.clone());

    TestApp { router, state, dir }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("GET", uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request("POST", uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(request("PUT", uri, Some(token), Some(body))).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(request("PATCH", uri, Some(token), Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(request("DELETE", uri, Some(token), None)).await
    }

    pub async fn create_user(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/api/user/create",
            None,
            json!({ "email": email, "password": password, "name": "Test name" }),
        )
        .await
    }

    /// Registers `email` and returns its token.
    pub async fn login_as(&self, email: &str) -> String {
        let (status, _) = self.create_user(email, PASSWORD).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .post(
                "/api/user/token",
                None,
                json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn create_recipe(&self, token: &str, body: Value) -> Value {
        let (status, body) = self.post("/api/recipe/recipes", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }

    pub async fn sample_recipe(&self, token: &str, title: &str) -> Value {
        self.create_recipe(
            token,
            json!({ "title": title, "time_minutes": 10, "price": "5.00" }),
        )
        .await
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

pub fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}
