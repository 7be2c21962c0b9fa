use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
    Json as JsonExtractor,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use utoipa::ToSchema;

use crate::error::{ApiError, BatchError};
use crate::models::{
    AppConfig, BatchRequest, BatchResponse, Job, JobResult, JobStatus, OptionsOverride, Progress,
};
use crate::services::{
    batch_stem, build_zip, BatchOutcome, BatchTicket, CancelOnDrop, OrchestratorHandle,
};

/// One image to convert
#[derive(Debug, Deserialize, ToSchema)]
pub struct JobPayload {
    /// Client-chosen identifier, echoed in the result
    pub id: String,
    /// Encoded image, base64 or a `data:` URL
    pub data: String,
    /// Native pixel width, used when the image header cannot be read
    #[serde(default)]
    pub width: Option<u32>,
    /// Native pixel height, used when the image header cannot be read
    #[serde(default)]
    pub height: Option<u32>,
}

/// Request body for batch conversion
#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchPayload {
    pub jobs: Vec<JobPayload>,
    /// Overrides for the configured default options
    #[serde(default)]
    pub options: Option<OptionsOverride>,
}

/// Converted image
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultPayload {
    pub id: String,
    /// Original image, base64
    pub original: String,
    /// Converted PNG (or the original on fallback), base64
    pub halftone: String,
    pub width: u32,
    pub height: u32,
    pub status: JobStatus,
}

/// Response body for batch conversion
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchResultPayload {
    /// One entry per job, in request order
    pub results: Vec<ResultPayload>,
    pub duration_ms: f64,
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorPayload {
    pub status: u16,
    pub error: String,
}

impl From<&JobResult> for ResultPayload {
    fn from(result: &JobResult) -> Self {
        Self {
            id: result.id.clone(),
            original: STANDARD.encode(&result.original),
            halftone: STANDARD.encode(&result.output),
            width: result.width,
            height: result.height,
            status: result.status.clone(),
        }
    }
}

impl From<&BatchResponse> for BatchResultPayload {
    fn from(response: &BatchResponse) -> Self {
        Self {
            results: response.results.iter().map(ResultPayload::from).collect(),
            duration_ms: response.duration_ms,
        }
    }
}

/// Strip an optional `data:<mime>;base64,` prefix and decode.
pub fn decode_payload(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let encoded = match data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, b64)| b64),
        None => data,
    };
    STANDARD.decode(encoded.trim())
}

fn build_request(payload: BatchPayload, config: &AppConfig) -> Result<BatchRequest, ApiError> {
    let options = payload
        .options
        .unwrap_or_default()
        .apply(config.defaults);
    options.validate().map_err(BatchError::from)?;

    let jobs = payload
        .jobs
        .into_iter()
        .map(|job| {
            let JobPayload {
                id,
                data,
                width,
                height,
            } = job;
            let bytes = decode_payload(&data)
                .map_err(|e| ApiError::InvalidRequest(format!("job {id}: invalid base64: {e}")))?;
            match (width, height) {
                (Some(width), Some(height)) if width > 0 && height > 0 => {
                    Ok(Job::admit_or_assume(id, bytes, width, height))
                }
                _ => Job::admit(id.clone(), bytes)
                    .map_err(|source| ApiError::InvalidJob { id, source }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BatchRequest { jobs, options })
}

/// Convert a batch of images
///
/// Runs every job and answers once the whole batch is done. Jobs that fail
/// to convert come back with their original image and a `fallback` status.
/// A job whose format cannot be recognised is rejected with 400 unless it
/// carries `width` and `height`, in which case it falls back like any other
/// failed job.
#[utoipa::path(
    post,
    path = "/api/batch",
    request_body = BatchPayload,
    responses(
        (status = 200, description = "Batch converted", body = BatchResultPayload),
        (status = 400, description = "Invalid options or undecodable job", body = ErrorPayload),
        (status = 409, description = "Another batch is running", body = ErrorPayload),
    ),
    tag = "Batch"
)]
pub async fn handle_batch(
    State(orchestrator): State<OrchestratorHandle>,
    State(config): State<Arc<AppConfig>>,
    JsonExtractor(payload): JsonExtractor<BatchPayload>,
) -> Result<Json<BatchResultPayload>, ApiError> {
    let request = build_request(payload, &config)?;
    tracing::info!(jobs = request.jobs.len(), "Batch request received");

    let response = orchestrator.submit(request)?.finish().await?;
    Ok(Json(BatchResultPayload::from(&response)))
}

/// Convert a batch of images into one zip download
///
/// Same request as `/api/batch`. The archive holds one entry per job named
/// `halftone_<n>_<w>x<h>.<ext>`; fallback and skipped jobs keep their
/// original bytes and extension.
#[utoipa::path(
    post,
    path = "/api/batch/zip",
    request_body = BatchPayload,
    responses(
        (status = 200, description = "Zip archive of the converted batch", body = Vec<u8>, content_type = "application/zip"),
        (status = 400, description = "Invalid options or undecodable job", body = ErrorPayload),
        (status = 409, description = "Another batch is running", body = ErrorPayload),
        (status = 500, description = "Archive could not be built", body = ErrorPayload),
    ),
    tag = "Batch"
)]
pub async fn handle_batch_zip(
    State(orchestrator): State<OrchestratorHandle>,
    State(config): State<Arc<AppConfig>>,
    JsonExtractor(payload): JsonExtractor<BatchPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let request = build_request(payload, &config)?;
    tracing::info!(jobs = request.jobs.len(), "Zip batch request received");

    let response = orchestrator.submit(request)?.finish().await?;
    let bytes = tokio::task::spawn_blocking(move || build_zip(&response.results))
        .await
        .map_err(|e| ApiError::Internal(format!("zip task failed: {e}")))??;

    let disposition = format!(
        "attachment; filename=\"{}.zip\"",
        batch_stem(chrono::Local::now())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

fn progress_event(progress: Progress) -> Event {
    Event::default()
        .event("progress")
        .json_data(progress)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}

fn outcome_event(outcome: BatchOutcome) -> Event {
    match outcome {
        Ok(response) => Event::default()
            .event("result")
            .json_data(BatchResultPayload::from(&response))
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string())),
        Err(e) => Event::default().event("error").data(e.to_string()),
    }
}

/// Convert a batch of images, streaming progress
///
/// Answers with server-sent events: one `progress` event (`{current,
/// total}`) per finished job, then a single `result` event carrying the
/// same body as `/api/batch`. Closing the stream cancels the remaining jobs.
#[utoipa::path(
    post,
    path = "/api/batch/events",
    request_body = BatchPayload,
    responses(
        (status = 200, description = "Event stream of progress and result", body = String, content_type = "text/event-stream"),
        (status = 400, description = "Invalid options or undecodable job", body = ErrorPayload),
        (status = 409, description = "Another batch is running", body = ErrorPayload),
    ),
    tag = "Batch"
)]
pub async fn handle_batch_events(
    State(orchestrator): State<OrchestratorHandle>,
    State(config): State<Arc<AppConfig>>,
    JsonExtractor(payload): JsonExtractor<BatchPayload>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let request = build_request(payload, &config)?;
    tracing::info!(jobs = request.jobs.len(), "Streaming batch request received");

    let ticket = orchestrator.submit(request)?;
    let guard = CancelOnDrop(ticket.cancel_handle());
    let BatchTicket {
        progress, reply, ..
    } = ticket;

    let progress = UnboundedReceiverStream::new(progress).map(|p| Ok(progress_event(p)));
    let result = stream::once(async move {
        let _guard = guard;
        Ok(outcome_event(reply.wait().await))
    });

    Ok(Sse::new(progress.chain(result)).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_payload_plain_and_data_url() {
        assert_eq!(decode_payload("aGk=").unwrap(), b"hi");
        assert_eq!(
            decode_payload("data:image/png;base64,aGk=").unwrap(),
            b"hi"
        );
        assert!(decode_payload("***").is_err());
    }

    #[test]
    fn test_result_payload_encodes_bytes() {
        let job = Job {
            id: "x".to_string(),
            data: Arc::from(&b"hi"[..]),
            width: 1,
            height: 1,
        };
        let payload = ResultPayload::from(&JobResult::skipped(&job));
        assert_eq!(payload.original, "aGk=");
        assert_eq!(payload.halftone, "aGk=");
        assert_eq!(payload.status, JobStatus::Skipped);
    }
}
