use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::notifier::{batch_failure_message, failure_message, success_message, Notifier};

use super::groups::parse_groups;
use super::progress_tracker::{
    new_progress_state, progress_snapshot, ProgressSink, ProgressState,
};
use super::transport::{Transport, UploadFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The service answered with a non-success status.
    Application,
    /// The transport itself raised an error.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    Success {
        track_id: Option<String>,
    },
    Failure {
        kind: FailureKind,
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedUpload {
    pub file_name: String,
    pub kind: FailureKind,
    pub error: String,
}

/// Summary of one submitted batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub groups: Vec<String>,
    pub total_files: usize,
    pub successful_uploads: Vec<String>,
    pub failed_uploads: Vec<FailedUpload>,
    /// Files whose upload task faulted before producing an outcome.
    pub faulted_uploads: Vec<String>,
    pub batch_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    fn new(groups: Vec<String>, total_files: usize) -> Self {
        let now = Utc::now();
        Self {
            batch_id: Uuid::new_v4(),
            groups,
            total_files,
            successful_uploads: Vec::new(),
            failed_uploads: Vec::new(),
            faulted_uploads: Vec::new(),
            batch_error: None,
            started_at: now,
            finished_at: now,
        }
    }

    fn record(&mut self, file_name: String, outcome: UploadOutcome) {
        match outcome {
            UploadOutcome::Success { .. } => self.successful_uploads.push(file_name),
            UploadOutcome::Failure { kind, reason } => self.failed_uploads.push(FailedUpload {
                file_name,
                kind,
                error: reason,
            }),
        }
    }

    pub fn completed(&self) -> usize {
        self.successful_uploads.len() + self.failed_uploads.len()
    }

    pub fn is_batch_failure(&self) -> bool {
        self.batch_error.is_some()
    }
}

/// Clears the busy flag when dropped, whichever way a batch ends.
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
        log::debug!("Upload busy state cleared");
    }
}

/// Fans a batch of files out to the transport and reports every outcome.
pub struct UploadOrchestrator {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    progress_state: ProgressState,
    busy: Arc<AtomicBool>,
}

impl UploadOrchestrator {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            notifier,
            progress_state: new_progress_state(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn progress_snapshot(&self) -> HashMap<String, u8> {
        progress_snapshot(&self.progress_state)
    }

    /// Enter the busy state, or `None` when a batch is already running.
    pub fn try_begin(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Upload every file of the batch with the groups parsed from `groups_text`.
    pub async fn submit_batch(
        &self,
        files: Vec<UploadFile>,
        groups_text: &str,
    ) -> AppResult<BatchReport> {
        let guard = self.try_begin().ok_or(AppError::UploadInProgress)?;
        Ok(self.run_batch(guard, files, groups_text).await)
    }

    /// Run a batch while holding `guard`.
    ///
    /// The batch is driven by a detached task that owns `guard`, so dropping
    /// the returned future neither stops notifications nor clears the busy
    /// state before every upload has settled.
    pub async fn run_batch(
        &self,
        guard: BusyGuard,
        files: Vec<UploadFile>,
        groups_text: &str,
    ) -> BatchReport {
        let groups = parse_groups(groups_text);
        let report = BatchReport::new(groups, files.len());
        let batch_id = report.batch_id;

        let driver = tokio::spawn(drive_batch(
            guard,
            Arc::clone(&self.transport),
            Arc::clone(&self.notifier),
            Arc::clone(&self.progress_state),
            files,
            report,
        ));

        match driver.await {
            Ok(report) => report,
            Err(e) => {
                log::error!("Batch {} driver faulted: {}", batch_id, e);
                self.notifier.failure(&batch_failure_message(&e));
                let mut report = BatchReport::new(Vec::new(), 0);
                report.batch_id = batch_id;
                report.batch_error = Some(e.to_string());
                report
            }
        }
    }
}

async fn drive_batch(
    guard: BusyGuard,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    progress_state: ProgressState,
    files: Vec<UploadFile>,
    mut report: BatchReport,
) -> BatchReport {
    let _guard = guard;

    if files.is_empty() {
        log::info!("Batch {} has no files, nothing to upload", report.batch_id);
        report.finished_at = Utc::now();
        return report;
    }

    log::info!(
        "Starting batch {}: {} files, groups {:?}",
        report.batch_id,
        files.len(),
        report.groups
    );

    let groups: Arc<[String]> = report.groups.clone().into();
    let mut uploads = FuturesUnordered::new();

    for file in files {
        let transport = Arc::clone(&transport);
        let notifier = Arc::clone(&notifier);
        let sink = ProgressSink::new(Arc::clone(&progress_state), file.name.clone());
        let groups = Arc::clone(&groups);
        let file_name = file.name.clone();

        let handle = tokio::spawn(async move {
            let outcome = upload_single_file(transport.as_ref(), &file, sink, &groups).await;
            notify_outcome(notifier.as_ref(), &file.name, &outcome);
            outcome
        });

        uploads.push(async move { (file_name, handle.await) });
    }

    let mut batch_error = None;

    while let Some((file_name, joined)) = uploads.next().await {
        match joined {
            Ok(outcome) => report.record(file_name, outcome),
            Err(e) => {
                log::error!("Upload task for {} faulted: {}", file_name, e);
                report.faulted_uploads.push(file_name);
                if batch_error.is_none() {
                    batch_error = Some(e);
                }
            }
        }
    }

    if let Some(e) = batch_error {
        notifier.failure(&batch_failure_message(&e));
        report.batch_error = Some(e.to_string());
    }

    report.finished_at = Utc::now();
    log::info!(
        "Batch {} finished: {}/{} successful, {} failed, {} faulted",
        report.batch_id,
        report.successful_uploads.len(),
        report.total_files,
        report.failed_uploads.len(),
        report.faulted_uploads.len()
    );

    report
}

fn notify_outcome(notifier: &dyn Notifier, file_name: &str, outcome: &UploadOutcome) {
    match outcome {
        UploadOutcome::Success { .. } => notifier.success(&success_message(file_name)),
        UploadOutcome::Failure { reason, .. } => {
            notifier.failure(&failure_message(file_name, reason))
        }
    }
}

/// Upload one file, converting every per-file failure into an outcome.
pub async fn upload_single_file(
    transport: &dyn Transport,
    file: &UploadFile,
    progress: ProgressSink,
    groups: &[String],
) -> UploadOutcome {
    match transport.upload(file, progress, groups).await {
        Ok(response) if response.is_success() => {
            log::info!("Uploaded {} ({} bytes)", file.name, file.size());
            UploadOutcome::Success {
                track_id: response.track_id,
            }
        }
        Ok(response) => {
            let reason = response.failure_reason();
            log::warn!(
                "Upload of {} rejected with status {}: {}",
                file.name,
                response.status,
                reason
            );
            UploadOutcome::Failure {
                kind: FailureKind::Application,
                reason,
            }
        }
        Err(e) => {
            if e.is_transport() {
                log::warn!("Transport failed for {}: {}", file.name, e);
            } else {
                log::error!("Upload of {} failed: {}", file.name, e);
            }
            UploadOutcome::Failure {
                kind: FailureKind::Transport,
                reason: e.user_message(),
            }
        }
    }
}
