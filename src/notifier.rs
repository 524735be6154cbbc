//! User-facing upload notifications.

use std::fmt::Display;

/// Surfaces transient success and failure messages to the user.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

/// Notifier that writes every message to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        log::info!("{}", message.replace('\n', " "));
    }

    fn failure(&self, message: &str) {
        log::error!("{}", message.replace('\n', " "));
    }
}

pub fn success_message(file_name: &str) -> String {
    format!("Upload Success:\n{} uploaded successfully", file_name)
}

pub fn failure_message(file_name: &str, reason: &str) -> String {
    format!("Upload Failed:\n{}\n{}", file_name, reason)
}

pub fn batch_failure_message(error: &impl Display) -> String {
    format!("Upload Failed\n{}", error)
}
