//! Batch document uploads with per-file progress and notifications.

pub mod config;
pub mod dialog;
pub mod errors;
pub mod notifier;
pub mod picker;
pub mod security;
pub mod uploader;

pub use dialog::{DialogPhase, UploadDialog};
pub use errors::{AppError, AppResult};
pub use notifier::{LogNotifier, Notifier};
