//! End-of-run summary and error statistics.

use std::collections::{BTreeMap, BTreeSet};

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, ProcessingStats};
use crate::probe::DomainCheckResult;

const UNLABELED: &str = "(unlabeled)";

/// Host name → display label map used by the summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayLabels(BTreeMap<String, String>);

impl DisplayLabels {
    /// Wraps an already normalized host → label map.
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self(labels)
    }

    /// Label of `host`, if one was configured.
    pub fn label_for(&self, host: &str) -> Option<&str> {
        self.0.get(host).map(String::as_str)
    }

    /// True when no label is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Aggregate counts over the final results of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditSummary {
    /// Domains with a result
    pub total: usize,
    /// Domains still broken
    pub broken: usize,
    /// Domains whose NS and A records both match
    pub fully_matched: usize,
    /// Domains with an NS match
    pub ns_matched: usize,
    /// Domains with an A match
    pub a_matched: usize,
    /// Domains with an MX match
    pub mx_matched: usize,
    /// Domains with a restrictive SPF record
    pub spf_valid: usize,
    /// Domains with a DMARC policy
    pub dmarc_valid: usize,
    /// Domains with at least one DKIM key
    pub dkim_valid: usize,
    /// Domains per NS display label (only when labels are configured)
    pub by_label: BTreeMap<String, usize>,
}

impl AuditSummary {
    /// Counts `results`, grouping name servers with `labels`.
    pub fn from_results(results: &[DomainCheckResult], labels: &DisplayLabels) -> Self {
        let mut summary = AuditSummary {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            if result.is_broken {
                summary.broken += 1;
                continue;
            }
            summary.fully_matched += usize::from(result.ns_match && result.a_match);
            summary.ns_matched += usize::from(result.ns_match);
            summary.a_matched += usize::from(result.a_match);
            summary.mx_matched += usize::from(result.mx_match);
            summary.spf_valid += usize::from(result.spf_valid);
            summary.dmarc_valid += usize::from(result.dmarc_valid);
            summary.dkim_valid += usize::from(result.dkim_valid);

            if !labels.is_empty() && !result.ns_records.is_empty() {
                let domain_labels: BTreeSet<&str> = result
                    .ns_records
                    .iter()
                    .map(|ns| labels.label_for(ns).unwrap_or(UNLABELED))
                    .collect();
                for label in domain_labels {
                    *summary.by_label.entry(label.to_string()).or_default() += 1;
                }
            }
        }
        summary
    }
}

/// Logs the audit summary.
pub fn print_summary(summary: &AuditSummary, elapsed_seconds: f64) {
    info!(
        "Audited {} domain{} in {:.1}s: {} fully matched, {} broken",
        summary.total,
        if summary.total == 1 { "" } else { "s" },
        elapsed_seconds,
        summary.fully_matched,
        summary.broken
    );
    info!(
        "   NS match: {}, A match: {}, MX match: {}",
        summary.ns_matched, summary.a_matched, summary.mx_matched
    );
    info!(
        "   SPF valid: {}, DMARC valid: {}, DKIM valid: {}",
        summary.spf_valid, summary.dmarc_valid, summary.dkim_valid
    );
    if !summary.by_label.is_empty() {
        info!("Name server usage:");
        for (label, count) in &summary.by_label {
            info!("   {label}: {count}");
        }
    }
}

/// Prints error statistics to the log.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    if total_errors == 0 {
        return;
    }

    info!(
        "Error Counts ({} total, {} domain-fatal):",
        total_errors,
        error_stats.total_fatal()
    );
    for error_type in ErrorType::iter() {
        let count = error_stats.get_error_count(error_type);
        if count > 0 {
            info!("   {}: {}", error_type.as_str(), count);
        }
    }
}
