//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use halftoner::models::AppConfig;
use halftoner::server::{build_router, create_app_state, AppState};
use halftoner::services::OrchestratorHandle;

/// Test application with router and direct access to the orchestrator
pub struct TestApp {
    router: axum::Router,
    pub orchestrator: OrchestratorHandle,
}

impl TestApp {
    /// Create a new test application with built-in defaults.
    ///
    /// Must be called inside a tokio runtime (`#[tokio::test]`).
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let state = Self::create_state(config);

        // Keep a handle for test assertions
        let orchestrator = state.orchestrator.clone();

        // Build router using shared server module (same as production)
        let router = build_router(state);

        Self {
            router,
            orchestrator,
        }
    }

    /// Wrap a router built from hand-made state
    pub fn from_router(router: axum::Router, orchestrator: OrchestratorHandle) -> Self {
        Self {
            router,
            orchestrator,
        }
    }

    /// Create state for custom router configuration
    pub fn create_state(config: AppConfig) -> AppState {
        create_app_state(config).expect("Failed to create app state")
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Server-sent events as `(event, data)` pairs, keep-alive comments dropped
    pub fn events(&self) -> Vec<(String, String)> {
        self.text()
            .split("\n\n")
            .filter_map(|block| {
                let mut event = None;
                let mut data = None;
                for line in block.lines() {
                    if let Some(name) = line.strip_prefix("event:") {
                        event = Some(name.trim().to_string());
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data = Some(value.trim().to_string());
                    }
                }
                Some((event?, data.unwrap_or_default()))
            })
            .collect()
    }
}
