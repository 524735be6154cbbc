use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Per-file upload percentage, keyed by file name.
pub type ProgressState = Arc<Mutex<HashMap<String, u8>>>;

pub fn new_progress_state() -> ProgressState {
    Arc::new(Mutex::new(HashMap::new()))
}

/// Safe progress state update
pub fn safe_progress_update<F>(progress_state: &ProgressState, operation: &str, f: F) -> bool
where
    F: FnOnce(&mut HashMap<String, u8>),
{
    match progress_state.lock() {
        Ok(mut progress) => {
            f(&mut progress);
            true
        }
        Err(e) => {
            log::error!(
                "Failed to acquire progress lock for {} (non-critical): {}",
                operation,
                e
            );
            false
        }
    }
}

pub fn safe_progress_read<F, R>(
    progress_state: &ProgressState,
    operation: &str,
    f: F,
) -> Option<R>
where
    F: FnOnce(&HashMap<String, u8>) -> R,
{
    match progress_state.lock() {
        Ok(progress) => Some(f(&progress)),
        Err(e) => {
            log::error!(
                "Failed to acquire progress lock for {} (non-critical): {}",
                operation,
                e
            );
            None
        }
    }
}

/// Copy of the current progress map for display.
pub fn progress_snapshot(progress_state: &ProgressState) -> HashMap<String, u8> {
    safe_progress_read(progress_state, "snapshot", |progress| progress.clone())
        .unwrap_or_default()
}

/// Progress capability handed to a transport for a single file.
///
/// Entries are only ever overwritten: a later batch reusing a file name
/// replaces the old value, names absent from the new batch keep theirs.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    progress_state: ProgressState,
    file_name: String,
}

impl ProgressSink {
    pub fn new(progress_state: ProgressState, file_name: impl Into<String>) -> Self {
        Self {
            progress_state,
            file_name: file_name.into(),
        }
    }

    /// Record the latest percentage reported by the transport.
    pub fn report(&self, percent: u8) {
        let percent = percent.min(100);
        log::debug!("Uploading {}: {}%", self.file_name, percent);
        safe_progress_update(&self.progress_state, "progress report", |progress| {
            progress.insert(self.file_name.clone(), percent);
        });
    }

    /// Report progress from a byte count, e.g. while streaming a body.
    pub fn report_bytes(&self, sent: u64, total: u64) {
        self.report(percent_of(sent, total));
    }
}

fn percent_of(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (sent.min(total) * 100 / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_overwrites_entry() {
        let state = new_progress_state();
        let sink = ProgressSink::new(state.clone(), "report.pdf");

        sink.report(10);
        sink.report(60);

        let snapshot = progress_snapshot(&state);
        assert_eq!(snapshot.get("report.pdf"), Some(&60));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_report_accepts_non_monotonic_values() {
        let state = new_progress_state();
        let sink = ProgressSink::new(state.clone(), "a.txt");

        sink.report(80);
        sink.report(40);

        assert_eq!(progress_snapshot(&state).get("a.txt"), Some(&40));
    }

    #[test]
    fn test_report_clamps_to_hundred() {
        let state = new_progress_state();
        ProgressSink::new(state.clone(), "a.txt").report(250);
        assert_eq!(progress_snapshot(&state).get("a.txt"), Some(&100));
    }

    #[test]
    fn test_report_bytes() {
        let state = new_progress_state();
        let sink = ProgressSink::new(state.clone(), "a.txt");

        sink.report_bytes(512, 2048);
        assert_eq!(progress_snapshot(&state).get("a.txt"), Some(&25));

        sink.report_bytes(0, 0);
        assert_eq!(progress_snapshot(&state).get("a.txt"), Some(&100));
    }

    #[test]
    fn test_stale_entries_are_kept() {
        let state = new_progress_state();
        ProgressSink::new(state.clone(), "old.md").report(100);
        ProgressSink::new(state.clone(), "new.md").report(5);

        let snapshot = progress_snapshot(&state);
        assert_eq!(snapshot.get("old.md"), Some(&100));
        assert_eq!(snapshot.get("new.md"), Some(&5));
    }
}
