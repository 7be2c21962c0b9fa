use serde::Serialize;
use std::io::Cursor;
use std::sync::Arc;
use utoipa::ToSchema;

use super::ProcessingOptions;
use crate::error::JobError;

/// One image queued for conversion.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    /// Original encoded image bytes
    pub data: Arc<[u8]>,
    /// Native pixel width
    pub width: u32,
    /// Native pixel height
    pub height: u32,
}

impl Job {
    /// Build a job from encoded bytes, probing the dimensions from the
    /// container header without decoding any pixels.
    pub fn admit(id: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Result<Self, JobError> {
        let data = data.into();
        let (width, height) = image::ImageReader::new(Cursor::new(&data[..]))
            .with_guessed_format()
            .map_err(|e| JobError::Decode(e.to_string()))?
            .into_dimensions()
            .map_err(|e| JobError::Decode(e.to_string()))?;

        Ok(Self {
            id: id.into(),
            data,
            width,
            height,
        })
    }

    /// Like [`admit`](Self::admit), but a header that cannot be read falls
    /// back to the dimensions the caller supplied. Such a job is kept in the
    /// batch and ends as a fallback result when decoding fails.
    pub fn admit_or_assume(
        id: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
        width: u32,
        height: u32,
    ) -> Self {
        let id = id.into();
        let data = data.into();
        match Self::admit(id.clone(), data.clone()) {
            Ok(job) => job,
            Err(e) => {
                tracing::debug!(
                    job = %id,
                    error = %e,
                    width,
                    height,
                    "Header unreadable, using given size"
                );
                Self {
                    id,
                    data,
                    width,
                    height,
                }
            }
        }
    }
}

/// How a job's output was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum JobStatus {
    /// Converted successfully
    Processed,
    /// Conversion failed; the output is the original image
    Fallback { reason: String },
    /// Batch was cancelled before this job ran; the output is the original image
    Skipped,
}

/// Outcome of one job. Every job yields exactly one result.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub id: String,
    pub original: Arc<[u8]>,
    pub output: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub status: JobStatus,
}

impl JobResult {
    pub fn processed(job: &Job, output: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            id: job.id.clone(),
            original: job.data.clone(),
            output: output.into(),
            width,
            height,
            status: JobStatus::Processed,
        }
    }

    /// Original bytes and dimensions, tagged with the failure reason.
    pub fn fallback(job: &Job, reason: impl Into<String>) -> Self {
        Self::passthrough(job, JobStatus::Fallback {
            reason: reason.into(),
        })
    }

    pub fn skipped(job: &Job) -> Self {
        Self::passthrough(job, JobStatus::Skipped)
    }

    fn passthrough(job: &Job, status: JobStatus) -> Self {
        Self {
            id: job.id.clone(),
            original: job.data.clone(),
            output: job.data.clone(),
            width: job.width,
            height: job.height,
            status,
        }
    }

    pub fn is_processed(&self) -> bool {
        self.status == JobStatus::Processed
    }
}

/// Progress notification, sent once per finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Progress {
    /// 1-based count of finished jobs
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub jobs: Vec<Job>,
    pub options: ProcessingOptions,
}

#[derive(Debug, Clone)]
pub struct BatchResponse {
    /// One result per job, in submission order
    pub results: Vec<JobResult>,
    /// Wall-clock time for the whole batch
    pub duration_ms: f64,
}

impl BatchResponse {
    pub fn fallback_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_processed()).count()
    }
}
