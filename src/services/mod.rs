pub mod archive;
pub mod decoder;
pub mod orchestrator;
pub mod pipeline;

pub use archive::{batch_stem, build_zip, ArchiveReport, Archiver, DirectoryArchiver, ZipArchiver};
pub use decoder::{ImageCrateDecoder, ImageDecoder};
pub use orchestrator::{
    BatchOutcome, BatchTicket, CancelHandle, CancelOnDrop, Orchestrator, OrchestratorHandle,
    OrchestratorState,
};
pub use pipeline::{Converted, JobPipeline};
