//! Progress logging utilities.

use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Logs progress of the current batch.
///
/// # Arguments
///
/// * `start_time` - The start time of the batch
/// * `completed` - Domains finished so far (broken included)
/// * `broken` - Domains marked broken so far
/// * `total` - Domains in the batch (0 until the batch reports its size)
pub fn log_progress(
    start_time: Instant,
    completed: &AtomicUsize,
    broken: &AtomicUsize,
    total: &AtomicUsize,
) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let completed = completed.load(Ordering::SeqCst);
    let rate = if elapsed_secs > 0.0 {
        completed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Processed {}/{} domains ({} broken) in {:.1} seconds (~{:.2} domains/sec)",
        completed,
        total.load(Ordering::SeqCst),
        broken.load(Ordering::SeqCst),
        elapsed_secs,
        rate
    );
}
