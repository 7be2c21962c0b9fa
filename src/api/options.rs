use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::models::{AppConfig, ProcessingOptions};

/// Get the default processing options
///
/// Options a batch uses for every field its request leaves out.
#[utoipa::path(
    get,
    path = "/api/options/defaults",
    responses(
        (status = 200, description = "Effective default options", body = ProcessingOptions),
    ),
    tag = "Options"
)]
pub async fn handle_defaults(State(config): State<Arc<AppConfig>>) -> Json<ProcessingOptions> {
    Json(config.defaults)
}
