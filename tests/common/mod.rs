#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use document_uploader::errors::{AppError, AppResult};
use document_uploader::notifier::Notifier;
use document_uploader::uploader::{ProgressSink, Transport, UploadFile, UploadResponse};
use tokio::sync::{Barrier, Notify};

/// What the scripted transport does for one file name.
#[derive(Clone)]
pub enum Script {
    Respond {
        progress: Vec<u8>,
        response: UploadResponse,
    },
    Fail {
        progress: Vec<u8>,
        message: String,
    },
    Panic,
    /// Signal `started`, then wait for `release` before succeeding.
    Gate {
        started: Arc<Notify>,
        release: Arc<Notify>,
    },
    /// Wait on a shared barrier before succeeding.
    Rendezvous(Arc<Barrier>),
}

impl Script {
    pub fn succeed(progress: &[u8]) -> Self {
        Script::Respond {
            progress: progress.to_vec(),
            response: UploadResponse::success(),
        }
    }

    pub fn fail(message: &str) -> Self {
        Script::Fail {
            progress: Vec::new(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub file_name: String,
    pub groups: Vec<String>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<UploadCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, file_name: &str, script: Script) -> Self {
        self.scripts.insert(file_name.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<UploadCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn upload(
        &self,
        file: &UploadFile,
        progress: ProgressSink,
        groups: &[String],
    ) -> AppResult<UploadResponse> {
        self.calls.lock().unwrap().push(UploadCall {
            file_name: file.name.clone(),
            groups: groups.to_vec(),
        });

        let script = self
            .scripts
            .get(&file.name)
            .cloned()
            .unwrap_or_else(|| Script::succeed(&[100]));

        match script {
            Script::Respond {
                progress: steps,
                response,
            } => {
                for step in steps {
                    progress.report(step);
                    tokio::task::yield_now().await;
                }
                Ok(response)
            }
            Script::Fail {
                progress: steps,
                message,
            } => {
                for step in steps {
                    progress.report(step);
                }
                Err(AppError::upload_failed(message))
            }
            Script::Panic => panic!("transport bug while uploading {}", file.name),
            Script::Gate { started, release } => {
                started.notify_one();
                release.notified().await;
                progress.report(100);
                Ok(UploadResponse::success())
            }
            Script::Rendezvous(barrier) => {
                barrier.wait().await;
                progress.report(100);
                Ok(UploadResponse::success())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Failure(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Success(message) | Notification::Failure(message) => message,
        }
    }
}

type BusyCheck = Box<dyn Fn() -> bool + Send + Sync>;

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
    busy_check: Mutex<Option<BusyCheck>>,
    busy_when_notified: Mutex<Vec<bool>>,
}

impl RecordingNotifier {
    /// Sample `check` every time a notification arrives.
    pub fn watch_busy(&self, check: impl Fn() -> bool + Send + Sync + 'static) {
        *self.busy_check.lock().unwrap() = Some(Box::new(check));
    }

    /// Busy state seen at each notification, in arrival order.
    pub fn busy_when_notified(&self) -> Vec<bool> {
        self.busy_when_notified.lock().unwrap().clone()
    }

    fn record(&self, notification: Notification) {
        if let Some(check) = self.busy_check.lock().unwrap().as_ref() {
            self.busy_when_notified.lock().unwrap().push(check());
        }
        self.notifications.lock().unwrap().push(notification);
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Success(message) => Some(message),
                Notification::Failure(_) => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Failure(message) => Some(message),
                Notification::Success(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.record(Notification::Success(message.to_string()));
    }

    fn failure(&self, message: &str) {
        self.record(Notification::Failure(message.to_string()));
    }
}

pub fn file(name: &str) -> UploadFile {
    UploadFile::new(name.to_string(), format!("contents of {}", name).into_bytes())
}
