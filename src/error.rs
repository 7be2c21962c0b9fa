use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use halftone_dither::HalftoneError;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single job. Never fatal for a batch: the orchestrator
/// turns it into a fallback result.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("PNG encode error: {0}")]
    Encode(String),

    #[error("Resample error: {0}")]
    Resample(#[from] HalftoneError),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// Invalid processing options. Fatal for the whole batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{width_cm} cm at {dpi} dpi is narrower than one pixel")]
    EmptyTarget { width_cm: f64, dpi: u32 },
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error("A batch is already running")]
    AlreadyRunning,

    #[error("Orchestrator has shut down")]
    Shutdown,
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid job {id}: {source}")]
    InvalidJob {
        id: String,
        #[source]
        source: JobError,
    },

    #[error("{0}")]
    Batch(#[from] BatchError),

    #[error("{0}")]
    Archive(#[from] ArchiveError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) | ApiError::InvalidJob { .. } => StatusCode::BAD_REQUEST,
            ApiError::Batch(BatchError::InvalidOptions(_)) => StatusCode::BAD_REQUEST,
            ApiError::Batch(BatchError::AlreadyRunning) => StatusCode::CONFLICT,
            ApiError::Batch(BatchError::Shutdown) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Archive(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_from_halftone_error() {
        let error: JobError = HalftoneError::InvalidDimensions {
            width: 0,
            height: 4,
        }
        .into();
        assert_eq!(
            error.to_string(),
            "Resample error: invalid dimensions: 0x4"
        );
    }

    #[test]
    fn test_options_error_out_of_range() {
        let error = OptionsError::OutOfRange {
            field: "contrast",
            value: 3.0,
            min: 0.8,
            max: 2.0,
        };
        assert_eq!(error.to_string(), "contrast = 3 is outside 0.8..=2");
    }

    #[test]
    fn test_batch_error_from_options_error() {
        let error: BatchError = OptionsError::NotFinite { field: "threshold" }.into();
        assert_eq!(
            error.to_string(),
            "Invalid options: threshold must be a finite number"
        );
    }

    #[test]
    fn test_api_error_into_response_status_codes() {
        let response = ApiError::InvalidRequest("bad base64".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::Batch(BatchError::AlreadyRunning).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ApiError::Batch(BatchError::InvalidOptions(OptionsError::NotFinite {
            field: "contrast",
        }))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::Batch(BatchError::Shutdown).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = ApiError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ApiError::Archive(ArchiveError::Zip(zip::result::ZipError::FileNotFound))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_error_invalid_job_message() {
        let error = ApiError::InvalidJob {
            id: "a".to_string(),
            source: JobError::Decode("unknown format".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "Invalid job a: Decode error: unknown format"
        );
    }
}
