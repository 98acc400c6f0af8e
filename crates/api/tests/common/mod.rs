//! Test infrastructure for API integration tests
//!
//! Provides an isolated in-process application per test (own database
//! in a unique temp directory, fixed token table) and helpers to drive
//! it with plain HTTP requests.

use std::collections::HashMap;
use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use taskboard_api::{build_state, router};
use taskboard_db::{Database, UserId};

/// Token authenticating user 1
pub const ALICE_TOKEN: &str = "alice-secret";

/// Token authenticating user 2
pub const BOB_TOKEN: &str = "bob-secret";

/// An isolated application instance backed by its own database.
pub struct TestApp {
    pub router: Router,
    temp_dir: PathBuf,
}

impl TestApp {
    /// Create a new application with a fresh database.
    ///
    /// Each call uses a uniquely named temp directory (process id,
    /// thread id, nanosecond timestamp) so tests can run concurrently.
    pub async fn spawn() -> Self {
        let temp_dir = std::env::temp_dir().join(format!(
            "tbd-api-test-{}-{:?}-{}",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        let db = Database::connect(&temp_dir).await.unwrap();
        db.init().await.unwrap();

        let mut tokens = HashMap::new();
        tokens.insert(ALICE_TOKEN.to_string(), UserId(1));
        tokens.insert(BOB_TOKEN.to_string(), UserId(2));

        let state = build_state(db, tokens).unwrap();

        Self {
            router: router(state),
            temp_dir,
        }
    }

    /// Send a request and return the status plus parsed JSON body.
    ///
    /// An empty response body comes back as `Value::Null`.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// GET with a token.
    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.request("GET", path, Some(token), None).await
    }

    /// POST a JSON body with a token.
    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", path, Some(token), Some(body)).await
    }

    /// PUT a JSON body with a token.
    pub async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", path, Some(token), Some(body)).await
    }

    /// PATCH a JSON body with a token.
    pub async fn patch(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("PATCH", path, Some(token), Some(body)).await
    }

    /// DELETE with a token.
    pub async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.request("DELETE", path, Some(token), None).await
    }

    /// Create a task and return its id.
    pub async fn create_task(&self, token: &str, body: Value) -> String {
        let (status, json) = self.post("/tasks", token, body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);
        json["id"].as_str().unwrap().to_string()
    }

    /// Create a group and return its id.
    pub async fn create_group(&self, token: &str, name: &str) -> String {
        let (status, json) = self
            .post("/task-groups", token, serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);
        json["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        // Auto-cleanup on drop
        let _ = std::fs::remove_dir_all(&self.temp_dir);
    }
}

/// Collect the task names from a list response, sorted.
pub fn result_names(body: &Value) -> Vec<String> {
    let mut names: Vec<String> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}
