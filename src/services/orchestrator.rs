//! Batch orchestrator: runs jobs one after another on a dedicated task.
//!
//! ```text
//! caller                         orchestrator task
//!   | submit(BatchRequest) ------> inbox
//!   |                               for each job:
//!   |                                 spawn_blocking(convert)
//!   | <------ Progress {i, n} ------  progress channel
//!   | <------ BatchResponse --------  oneshot reply
//! ```
//!
//! Only one batch may be in flight; a second `submit` is rejected with
//! [`BatchError::AlreadyRunning`] until the first one has replied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

use crate::error::BatchError;
use crate::models::{BatchRequest, BatchResponse, JobResult, Progress};
use crate::services::pipeline::JobPipeline;

const INBOX_CAPACITY: usize = 1;

/// Final outcome of a batch.
pub type BatchOutcome = Result<BatchResponse, BatchError>;

/// A batch handed to the orchestrator together with its reply channels.
struct Submission {
    request: BatchRequest,
    progress: mpsc::UnboundedSender<Progress>,
    reply: oneshot::Sender<BatchOutcome>,
    cancel: CancelHandle,
}

/// Cooperative cancellation flag, checked between jobs.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Cancels the batch when dropped, e.g. when a streaming client goes away.
pub struct CancelOnDrop(pub CancelHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Pending final response of a submitted batch.
pub struct BatchReply(oneshot::Receiver<BatchOutcome>);

impl BatchReply {
    pub async fn wait(self) -> BatchOutcome {
        self.0.await.map_err(|_| BatchError::Shutdown)?
    }
}

/// Caller side of one submitted batch.
pub struct BatchTicket {
    /// One event per finished job, `current` counting 1..=total
    pub progress: mpsc::UnboundedReceiver<Progress>,
    pub reply: BatchReply,
    cancel: CancelHandle,
}

impl BatchTicket {
    /// Stop after the job currently running; the rest are marked skipped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Wait for the final response, discarding progress.
    pub async fn finish(self) -> BatchOutcome {
        self.reply.wait().await
    }
}

/// Cloneable handle for submitting batches.
#[derive(Clone)]
pub struct OrchestratorHandle {
    inbox: mpsc::Sender<Submission>,
    busy: Arc<AtomicBool>,
}

impl OrchestratorHandle {
    /// Queue a batch. Fails immediately when another batch is in flight
    /// or the orchestrator task has stopped.
    pub fn submit(&self, request: BatchRequest) -> Result<BatchTicket, BatchError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BatchError::AlreadyRunning);
        }

        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = oneshot::channel();
        let cancel = CancelHandle::default();
        let submission = Submission {
            request,
            progress: progress_tx,
            reply: reply_tx,
            cancel: cancel.clone(),
        };

        if let Err(e) = self.inbox.try_send(submission) {
            self.busy.store(false, Ordering::Release);
            return Err(match e {
                mpsc::error::TrySendError::Full(_) => BatchError::AlreadyRunning,
                mpsc::error::TrySendError::Closed(_) => BatchError::Shutdown,
            });
        }

        Ok(BatchTicket {
            progress: progress_rx,
            reply: BatchReply(reply_rx),
            cancel,
        })
    }

    /// Submit a batch and drive it to completion, reporting progress.
    pub async fn process(
        &self,
        request: BatchRequest,
        mut on_progress: impl FnMut(Progress),
    ) -> BatchOutcome {
        let mut ticket = self.submit(request)?;
        while let Some(progress) = ticket.progress.recv().await {
            on_progress(progress);
        }
        ticket.finish().await
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Running { completed: usize, total: usize },
    Completed,
}

/// Worker side. Owns the inbox; build with [`channel`] and spawn [`run`](Self::run).
pub struct Orchestrator {
    inbox: mpsc::Receiver<Submission>,
    busy: Arc<AtomicBool>,
    pipeline: JobPipeline,
    state: OrchestratorState,
}

/// Create a connected handle and orchestrator.
pub fn channel(pipeline: JobPipeline) -> (OrchestratorHandle, Orchestrator) {
    let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
    let busy = Arc::new(AtomicBool::new(false));
    let handle = OrchestratorHandle {
        inbox: tx,
        busy: busy.clone(),
    };
    (handle, Orchestrator::new(rx, busy, pipeline))
}

/// Create an orchestrator and spawn it on the current runtime.
pub fn spawn(pipeline: JobPipeline) -> OrchestratorHandle {
    let (handle, orchestrator) = channel(pipeline);
    tokio::spawn(orchestrator.run());
    handle
}

impl Orchestrator {
    fn new(
        inbox: mpsc::Receiver<Submission>,
        busy: Arc<AtomicBool>,
        pipeline: JobPipeline,
    ) -> Self {
        Self {
            inbox,
            busy,
            pipeline,
            state: OrchestratorState::Idle,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Serve submissions until every handle is dropped.
    pub async fn run(mut self) {
        while let Some(submission) = self.inbox.recv().await {
            self.run_batch(submission).await;
        }
        tracing::debug!("Orchestrator inbox closed, stopping");
    }

    async fn run_batch(&mut self, submission: Submission) {
        let Submission {
            request,
            progress,
            reply,
            cancel,
        } = submission;
        let BatchRequest { jobs, options } = request;

        if let Err(e) = options.validate() {
            tracing::warn!(%e, "Rejecting batch with invalid options");
            self.finish(reply, Err(e.into()));
            return;
        }

        let start = Instant::now();
        let total = jobs.len();
        self.state = OrchestratorState::Running {
            completed: 0,
            total,
        };
        tracing::info!(jobs = total, tone = %options.tone_mode, "Batch started");

        let mut results: Vec<JobResult> = Vec::with_capacity(total);
        for (index, job) in jobs.into_iter().enumerate() {
            let result = if cancel.is_cancelled() {
                JobResult::skipped(&job)
            } else {
                self.pipeline.run_in_blocking_context(job, options).await
            };
            results.push(result);

            let current = index + 1;
            self.state = OrchestratorState::Running {
                completed: current,
                total,
            };
            // The caller may have stopped listening; the batch still completes.
            let _ = progress.send(Progress { current, total });
        }

        let response = BatchResponse {
            results,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        tracing::info!(
            jobs = total,
            fallbacks = response.fallback_count(),
            cancelled = cancel.is_cancelled(),
            duration_ms = response.duration_ms,
            "Batch finished"
        );
        self.state = OrchestratorState::Completed;
        self.finish(reply, Ok(response));
    }

    fn finish(&self, reply: oneshot::Sender<BatchOutcome>, outcome: BatchOutcome) {
        self.busy.store(false, Ordering::Release);
        if reply.send(outcome).is_err() {
            tracing::debug!("Batch caller went away before the reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{JobError, OptionsError};
    use crate::models::{Job, JobStatus, ProcessingOptions};
    use crate::rendering::PngEncoder;
    use crate::services::decoder::ImageDecoder;
    use halftone_dither::PixelBuffer;
    use std::io::Cursor;

    struct FailingDecoder;

    impl ImageDecoder for FailingDecoder {
        fn decode(&self, _bytes: &[u8]) -> Result<PixelBuffer, JobError> {
            Err(JobError::Decode("forced failure".to_string()))
        }
    }

    fn png_job(id: &str) -> Job {
        let mut buf = Cursor::new(Vec::new());
        image::RgbaImage::from_pixel(6, 4, image::Rgba([90, 90, 90, 255]))
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        Job::admit(id, buf.into_inner()).unwrap()
    }

    fn request(n: usize) -> BatchRequest {
        BatchRequest {
            jobs: (0..n).map(|i| png_job(&format!("job-{i}"))).collect(),
            options: ProcessingOptions {
                output_width_cm: 2.54,
                print_dpi: 30,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_batch_completeness() {
        let handle = spawn(JobPipeline::default());
        let mut events = Vec::new();
        let response = handle
            .process(request(4), |p| events.push(p))
            .await
            .unwrap();

        let expected: Vec<_> = (1..=4).map(|current| Progress { current, total: 4 }).collect();
        assert_eq!(events, expected);
        assert_eq!(response.results.len(), 4);
        for (i, result) in response.results.iter().enumerate() {
            assert_eq!(result.id, format!("job-{i}"));
            assert!(result.is_processed());
            assert_eq!((result.width, result.height), (30, 20));
        }
        assert!(response.duration_ms >= 0.0);
        assert!(!handle.is_busy());
    }

    #[tokio::test]
    async fn test_forced_decode_failure_falls_back() {
        let pipeline = JobPipeline::new(Arc::new(FailingDecoder), Arc::new(PngEncoder));
        let handle = spawn(pipeline);
        let batch = request(3);
        let originals: Vec<_> = batch.jobs.iter().map(|j| j.data.clone()).collect();

        let mut count = 0;
        let response = handle.process(batch, |_| count += 1).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(response.fallback_count(), 3);
        for (result, original) in response.results.iter().zip(originals) {
            assert_eq!(result.output, original);
            assert_eq!((result.width, result.height), (6, 4));
            assert_eq!(
                result.status,
                JobStatus::Fallback {
                    reason: "Decode error: forced failure".to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_one_bad_job_does_not_stop_batch() {
        let handle = spawn(JobPipeline::default());
        let mut batch = request(3);
        batch.jobs[1].data = Arc::from(&b"not an image"[..]);

        let response = handle.process(batch, |_| {}).await.unwrap();
        assert!(response.results[0].is_processed());
        assert!(!response.results[1].is_processed());
        assert!(response.results[2].is_processed());
    }

    #[tokio::test]
    async fn test_rejects_second_batch_while_running() {
        let handle = spawn(JobPipeline::default());
        let first = handle.submit(request(2)).unwrap();

        assert!(matches!(
            handle.submit(request(1)),
            Err(BatchError::AlreadyRunning)
        ));

        first.finish().await.unwrap();
        let second = handle.submit(request(1)).unwrap();
        assert_eq!(second.finish().await.unwrap().results.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_options_rejected_before_any_job() {
        let handle = spawn(JobPipeline::default());
        let mut batch = request(2);
        batch.options.contrast = 5.0;

        let mut ticket = handle.submit(batch).unwrap();
        let reply = ticket.reply.wait().await;
        assert!(matches!(
            reply,
            Err(BatchError::InvalidOptions(OptionsError::OutOfRange {
                field: "contrast",
                ..
            }))
        ));
        assert_eq!(ticket.progress.recv().await, None);
        assert!(!handle.is_busy());
    }

    #[tokio::test]
    async fn test_cancel_before_start_skips_everything() {
        let handle = spawn(JobPipeline::default());
        let batch = request(3);
        let originals: Vec<_> = batch.jobs.iter().map(|j| j.data.clone()).collect();

        let mut ticket = handle.submit(batch).unwrap();
        ticket.cancel();

        let mut events = 0;
        while ticket.progress.recv().await.is_some() {
            events += 1;
        }
        let response = ticket.finish().await.unwrap();

        assert_eq!(events, 3);
        for (result, original) in response.results.iter().zip(originals) {
            assert_eq!(result.status, JobStatus::Skipped);
            assert_eq!(result.output, original);
        }
    }

    #[tokio::test]
    async fn test_cancel_mid_batch() {
        let handle = spawn(JobPipeline::default());
        let mut ticket = handle.submit(request(4)).unwrap();

        let first = ticket.progress.recv().await.unwrap();
        assert_eq!(first, Progress { current: 1, total: 4 });
        ticket.cancel();

        let response = ticket.finish().await.unwrap();
        assert_eq!(response.results.len(), 4);
        assert!(response.results[0].is_processed());
        assert_eq!(response.results[3].status, JobStatus::Skipped);
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let (handle, mut orchestrator) = channel(JobPipeline::default());
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);

        let ticket = handle.submit(request(2)).unwrap();
        let submission = orchestrator.inbox.recv().await.unwrap();
        orchestrator.run_batch(submission).await;

        assert_eq!(orchestrator.state(), OrchestratorState::Completed);
        assert_eq!(ticket.finish().await.unwrap().results.len(), 2);
    }

    #[tokio::test]
    async fn test_channel_pair_shares_busy_flag() {
        let (handle, mut orchestrator) = channel(JobPipeline::default());
        let ticket = handle.submit(request(1)).unwrap();
        assert!(handle.is_busy());

        let submission = orchestrator.inbox.recv().await.unwrap();
        orchestrator.run_batch(submission).await;

        assert!(!handle.is_busy());
        assert_eq!(ticket.finish().await.unwrap().results.len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_when_orchestrator_dropped() {
        let (handle, orchestrator) = channel(JobPipeline::default());
        drop(orchestrator);
        assert!(matches!(
            handle.submit(request(1)),
            Err(BatchError::Shutdown)
        ));
        assert!(!handle.is_busy());
    }
}
