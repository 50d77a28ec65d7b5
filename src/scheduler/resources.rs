//! Run-scoped scheduler state.
//!
//! Progress counters and the broken-domain list live here, one instance per
//! batch, shared by every task through an `Arc`.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Type alias for progress callback function: `(completed, broken, total)`.
pub type ProgressCallback = Option<Arc<dyn Fn(usize, usize, usize) + Send + Sync>>;

/// Counters and broken list of one batch run.
pub(crate) struct RunState {
    completed: AtomicUsize,
    broken_count: AtomicUsize,
    total: usize,
    broken: Arc<Mutex<Vec<String>>>,
    progress: ProgressCallback,
}

impl RunState {
    pub(crate) fn new(total: usize, progress: ProgressCallback) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            broken_count: AtomicUsize::new(0),
            total,
            broken: Arc::new(Mutex::new(Vec::new())),
            progress,
        }
    }

    /// Counts one finished domain and reports progress.
    pub(crate) fn finish(&self, domain: &str, is_broken: bool) {
        if is_broken {
            self.broken
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(domain.to_string());
            self.broken_count.fetch_add(1, Ordering::SeqCst);
        }
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        invoke_progress_callback(
            &self.progress,
            completed,
            self.broken_count.load(Ordering::SeqCst),
            self.total,
        );
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Copy of the broken list, taken under its lock.
    pub(crate) fn broken_snapshot(&self) -> Vec<String> {
        self.broken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Calls the progress callback, containing any panic it raises.
pub(crate) fn invoke_progress_callback(
    callback: &ProgressCallback,
    completed: usize,
    broken: usize,
    total: usize,
) {
    let Some(callback) = callback else {
        return;
    };
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(completed, broken, total))) {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        log::warn!("Progress callback panicked: {message}");
    }
}
