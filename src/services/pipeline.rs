//! Per-job conversion: decode, resample, tone map, encode, embed.

use std::sync::Arc;

use crate::error::JobError;
use crate::models::{Job, JobResult, ProcessingOptions};
use crate::rendering::{embed_physical_resolution, ImageEncoder, PngEncoder};
use crate::services::decoder::{ImageCrateDecoder, ImageDecoder};

/// Output of a successful conversion.
#[derive(Debug, Clone)]
pub struct Converted {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Converts one job at a time. Stateless apart from its collaborators, so
/// one instance can be shared by every batch.
#[derive(Clone)]
pub struct JobPipeline {
    decoder: Arc<dyn ImageDecoder>,
    encoder: Arc<dyn ImageEncoder>,
}

impl Default for JobPipeline {
    fn default() -> Self {
        Self::new(Arc::new(ImageCrateDecoder), Arc::new(PngEncoder))
    }
}

impl JobPipeline {
    pub fn new(decoder: Arc<dyn ImageDecoder>, encoder: Arc<dyn ImageEncoder>) -> Self {
        Self { decoder, encoder }
    }

    /// Run every stage for one job. Any error aborts this job only.
    pub fn convert(&self, job: &Job, options: &ProcessingOptions) -> Result<Converted, JobError> {
        let pixels = self.decoder.decode(&job.data)?;
        let (src_width, src_height) = pixels.dimensions();
        let target = options.target_for(src_width, src_height)?;

        tracing::debug!(
            job = %job.id,
            src_width,
            src_height,
            width = target.width,
            height = target.height,
            height_cm = target.height_cm(),
            tone = %options.tone_mode,
            mode = %options.mode,
            "Converting job"
        );

        let image = options
            .halftoner()
            .resize(target.width, target.height)
            .process(pixels)?;
        let encoded = self.encoder.encode(&image)?;
        let bytes = embed_physical_resolution(&encoded, options.print_dpi);

        Ok(Converted {
            bytes,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Convert a job, recording a fallback result on failure.
    pub fn run(&self, job: &Job, options: &ProcessingOptions) -> JobResult {
        match self.convert(job, options) {
            Ok(converted) => {
                JobResult::processed(job, converted.bytes, converted.width, converted.height)
            }
            Err(e) => {
                tracing::warn!(job = %job.id, error = %e, "Job failed, keeping original image");
                JobResult::fallback(job, e.to_string())
            }
        }
    }

    /// Execute CPU-intensive conversion in a blocking context
    pub async fn run_in_blocking_context(
        &self,
        job: Job,
        options: ProcessingOptions,
    ) -> JobResult {
        let pipeline = self.clone();
        let worker_job = job.clone();

        match tokio::task::spawn_blocking(move || pipeline.run(&worker_job, &options)).await {
            Ok(result) => result,
            Err(e) => {
                let error = JobError::Worker(e.to_string());
                tracing::error!(job = %job.id, error = %error, "Conversion task failed");
                JobResult::fallback(&job, error.to_string())
            }
        }
    }
}
