//! Upload dialog state machine.
//!
//! The dialog starts `Closed`, becomes `OpenIdle` when opened and
//! `OpenUploading` while a batch runs. Closing is refused mid-upload.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::{AppError, AppResult};
use crate::notifier::Notifier;
use crate::uploader::{BatchReport, Transport, UploadFile, UploadOrchestrator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    Closed,
    OpenIdle,
    OpenUploading,
}

#[derive(Debug, Default)]
struct DialogState {
    open: bool,
    groups_text: String,
}

pub struct UploadDialog {
    orchestrator: UploadOrchestrator,
    state: Mutex<DialogState>,
}

impl UploadDialog {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            orchestrator: UploadOrchestrator::new(transport, notifier),
            state: Mutex::new(DialogState::default()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, DialogState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            log::warn!("Dialog state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn phase(&self) -> DialogPhase {
        let state = self.lock_state();
        if !state.open {
            DialogPhase::Closed
        } else if self.orchestrator.is_busy() {
            DialogPhase::OpenUploading
        } else {
            DialogPhase::OpenIdle
        }
    }

    pub fn is_busy(&self) -> bool {
        self.orchestrator.is_busy()
    }

    pub fn open(&self) {
        let mut state = self.lock_state();
        if !state.open {
            state.open = true;
            log::debug!("Upload dialog opened");
        }
    }

    /// Close the dialog. Returns `false` when refused because an upload is running.
    pub fn request_close(&self) -> bool {
        let mut state = self.lock_state();
        if self.orchestrator.is_busy() {
            log::debug!("Ignoring close request while uploading");
            return false;
        }
        state.open = false;
        true
    }

    pub fn groups_text(&self) -> String {
        self.lock_state().groups_text.clone()
    }

    /// Edit the groups field. The input is disabled while uploading.
    pub fn set_groups_text(&self, text: impl Into<String>) -> bool {
        let mut state = self.lock_state();
        if self.orchestrator.is_busy() {
            return false;
        }
        state.groups_text = text.into();
        true
    }

    pub fn progress_snapshot(&self) -> HashMap<String, u8> {
        self.orchestrator.progress_snapshot()
    }

    /// Submit the picked files with the current groups text.
    pub async fn submit(&self, files: Vec<UploadFile>) -> AppResult<BatchReport> {
        let (guard, groups_text) = {
            let state = self.lock_state();
            if !state.open {
                return Err(AppError::DialogClosed);
            }
            let guard = self
                .orchestrator
                .try_begin()
                .ok_or(AppError::UploadInProgress)?;
            (guard, state.groups_text.clone())
        };

        Ok(self.orchestrator.run_batch(guard, files, &groups_text).await)
    }
}
