pub mod batch;
pub mod options;

use utoipa::OpenApi;

pub use batch::{__path_handle_batch, __path_handle_batch_events, __path_handle_batch_zip};
pub use batch::{
    handle_batch, handle_batch_events, handle_batch_zip, BatchPayload, BatchResultPayload,
    ErrorPayload, JobPayload, ResultPayload,
};
pub use options::{handle_defaults, __path_handle_defaults};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Halftoner API",
        description = "Print-sized black and white halftone batch conversion",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(handle_batch, handle_batch_events, handle_batch_zip, handle_defaults),
    components(schemas(
        BatchPayload,
        BatchResultPayload,
        ErrorPayload,
        JobPayload,
        ResultPayload,
        crate::models::ProcessingOptions,
        crate::models::OptionsOverride,
        crate::models::JobStatus,
        crate::models::Progress,
    )),
    tags(
        (name = "Batch", description = "Batch halftone conversion"),
        (name = "Options", description = "Processing defaults")
    )
)]
pub struct ApiDoc;
