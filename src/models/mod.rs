pub mod config;
pub mod job;
pub mod options;

pub use config::{AppConfig, DEFAULT_MAX_BODY_BYTES};
pub use job::{BatchRequest, BatchResponse, Job, JobResult, JobStatus, Progress};
pub use options::{OptionsOverride, ProcessingOptions};
