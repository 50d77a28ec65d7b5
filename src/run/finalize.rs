//! Audit finalization.
//!
//! Folds the retry pass into the first pass, prints the summary and builds the
//! report returned to the caller.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::app::{print_error_statistics, print_summary, AuditSummary, DisplayLabels};
use crate::error_handling::ProcessingStats;
use crate::probe::DomainCheckResult;
use crate::scheduler::BatchReport;

use super::AuditReport;

/// Latest result per domain: retried results replace first-pass ones in place.
pub(crate) fn merge_results(
    first_pass: &[DomainCheckResult],
    retried: &[DomainCheckResult],
) -> Vec<DomainCheckResult> {
    let latest: HashMap<&str, &DomainCheckResult> = retried
        .iter()
        .map(|result| (result.domain.as_str(), result))
        .collect();
    first_pass
        .iter()
        .map(|result| {
            latest
                .get(result.domain.as_str())
                .map_or_else(|| result.clone(), |&retried| retried.clone())
        })
        .collect()
}

/// Prints the end-of-run summary and error statistics and builds the report.
pub(crate) fn finalize_audit(
    domains_read: usize,
    first_pass: &BatchReport,
    retried: &[DomainCheckResult],
    labels: &DisplayLabels,
    stats: &ProcessingStats,
    output: PathBuf,
    start_time: Instant,
) -> AuditReport {
    let results = merge_results(&first_pass.results, retried);
    let summary = AuditSummary::from_results(&results, labels);
    let elapsed_seconds = start_time.elapsed().as_secs_f64();

    print_error_statistics(stats);
    print_summary(&summary, elapsed_seconds);
    if !first_pass.skipped.is_empty() {
        log::info!(
            "{} domain(s) skipped from a previous run (checkpoint)",
            first_pass.skipped.len()
        );
    }
    if !first_pass.unscheduled.is_empty() {
        log::warn!(
            "{} domain(s) not started before cancellation; rerun with --resume to finish",
            first_pass.unscheduled.len()
        );
    }

    AuditReport {
        domains_read,
        probed: results.len(),
        skipped: first_pass.skipped.len(),
        unscheduled: first_pass.unscheduled.len(),
        matched: summary.fully_matched,
        broken: summary.broken,
        retried: retried.len(),
        output,
        elapsed_seconds,
    }
}
