//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{self, ApiDoc};
use crate::models::AppConfig;
use crate::services::{orchestrator, JobPipeline, OrchestratorHandle};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: OrchestratorHandle,
    pub config: Arc<AppConfig>,
}

impl FromRef<AppState> for OrchestratorHandle {
    fn from_ref(state: &AppState) -> Self {
        state.orchestrator.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// Create application state and start the batch orchestrator.
///
/// Must be called from within a tokio runtime.
pub fn create_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    tokio::runtime::Handle::try_current()
        .map_err(|e| anyhow::anyhow!("Orchestrator needs a tokio runtime: {e}"))?;

    let orchestrator = orchestrator::spawn(JobPipeline::default());

    Ok(AppState {
        orchestrator,
        config: Arc::new(config),
    })
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests. It serves
/// the OpenAPI document at `/api-docs/openapi.json` and the Swagger UI
/// at `/swagger-ui`.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        // Batch conversion
        .route("/api/batch", post(api::handle_batch))
        .route("/api/batch/events", post(api::handle_batch_events))
        .route("/api/batch/zip", post(api::handle_batch_zip))
        .route("/api/options/defaults", get(api::handle_defaults))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        // OpenAPI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Base64 inflates images by a third; the default 2 MB limit is far too small
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}
