// Uploader module - fans document batches out to the upload service
//
// Groups parsing, progress tracking, the transport seam and the batch
// orchestrator live here.

pub mod groups;
pub mod http_client;
pub mod progress_tracker;
pub mod transport;
pub mod upload_queue;

pub use groups::parse_groups;
pub use http_client::HttpTransport;
pub use progress_tracker::{ProgressSink, ProgressState};
pub use transport::{Transport, UploadFile, UploadResponse, UploadStatus};
pub use upload_queue::{
    BatchReport, BusyGuard, FailedUpload, FailureKind, UploadOrchestrator, UploadOutcome,
};
