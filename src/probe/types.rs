//! Prober types: the per-domain result, settings and shared context.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::dns::{DnsResolver, RetryPolicy};
use crate::error_handling::{ProbeError, ProcessingStats};

/// DKIM key found under one selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DkimSelectorResult {
    /// Raw TXT value starting with `v=DKIM1`
    pub record: String,
    /// True when the record carries a `p=` tag
    pub valid: bool,
}

/// Everything learned about one domain.
///
/// When `is_broken` is set, the match and validity fields (`ns_match`,
/// `a_match`, `mx_match`, `spf_valid`, `dmarc_valid`, `dkim_valid`,
/// `dkim_records`) hold their defaults and mean "unknown"; the raw record
/// fields keep whatever was collected before the failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainCheckResult {
    /// Normalized domain name (raw input when normalization failed)
    pub domain: String,
    /// NS host names, lower-cased without trailing dot, in response order
    pub ns_records: Vec<String>,
    /// A addresses as returned, in response order
    pub a_records: Vec<String>,
    /// MX exchanges, lower-cased without trailing dot, in response order
    pub mx_records: Vec<String>,
    /// Any NS equals a target NS
    pub ns_match: bool,
    /// Any A address equals a target address
    pub a_match: bool,
    /// Any MX contains a target MX (false without MX targets)
    pub mx_match: bool,
    /// Concatenated SPF fragments
    pub spf_record: Option<String>,
    /// SPF ends with `-all` or `~all`
    pub spf_valid: bool,
    /// First `v=DMARC1` record at `_dmarc.<domain>`
    pub dmarc_record: Option<String>,
    /// DMARC record carries a `p=` tag
    pub dmarc_valid: bool,
    /// Selectors that answered with a DKIM-formatted record
    pub dkim_selector_results: BTreeMap<String, DkimSelectorResult>,
    /// Selectors with a DKIM-formatted record, in probing order
    pub dkim_records: Vec<String>,
    /// Any selector yields a key
    pub dkim_valid: bool,
    /// The domain could not be evaluated
    pub is_broken: bool,
    /// Why the domain is broken
    pub error_reason: Option<String>,
    /// Failed queries that did not abort the domain, in query order
    pub query_errors: Vec<String>,
}

impl DomainCheckResult {
    /// Empty result for `domain`.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// Marks the result broken and resets every derived field to "unknown".
    pub fn mark_broken(&mut self, error: &ProbeError) {
        self.is_broken = true;
        self.error_reason = Some(error.to_string());
        self.ns_match = false;
        self.a_match = false;
        self.mx_match = false;
        self.spf_valid = false;
        self.dmarc_valid = false;
        self.dkim_valid = false;
        self.dkim_records.clear();
    }

    /// Broken result for an input that was rejected before any query.
    pub fn invalid(raw: &str, error: &ProbeError) -> Self {
        let mut result = Self::new(raw.trim());
        result.mark_broken(error);
        result
    }
}

/// Expected infrastructure endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    /// Expected NS host names
    pub ns: Vec<String>,
    /// Expected A addresses
    pub a: Vec<String>,
    /// Expected MX host names; MX matching is skipped when `None`
    pub mx: Option<Vec<String>>,
}

/// Per-run prober settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Match targets
    pub targets: Targets,
    /// Timeout and retry policy of every query
    pub retry: RetryPolicy,
    /// Deadline for the whole domain
    pub domain_timeout: Duration,
    /// DKIM selectors, probed concurrently, reported in this order
    pub dkim_selectors: Vec<String>,
}

/// Shared, read-only state every probe needs.
pub struct ProbeContext {
    /// Resolver used for every query
    pub resolver: Arc<dyn DnsResolver>,
    /// Run settings
    pub settings: ProbeSettings,
    /// Failure counters for the run
    pub stats: Arc<ProcessingStats>,
}

impl ProbeContext {
    /// Creates a context with fresh statistics.
    pub fn new(resolver: Arc<dyn DnsResolver>, settings: ProbeSettings) -> Self {
        Self {
            resolver,
            settings,
            stats: Arc::new(ProcessingStats::new()),
        }
    }
}

/// Outcome of one domain probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Every query ran (some may have failed and been recorded).
    Completed(DomainCheckResult),
    /// The domain was abandoned; `result` is already marked broken.
    Failed {
        /// Partial result
        result: DomainCheckResult,
        /// Why the domain was abandoned
        error: ProbeError,
    },
}

impl ProbeOutcome {
    /// The result, broken or not.
    pub fn into_result(self) -> DomainCheckResult {
        match self {
            ProbeOutcome::Completed(result) => result,
            ProbeOutcome::Failed { result, .. } => result,
        }
    }

    /// The error that abandoned the domain, if any.
    pub fn error(&self) -> Option<&ProbeError> {
        match self {
            ProbeOutcome::Completed(_) => None,
            ProbeOutcome::Failed { error, .. } => Some(error),
        }
    }
}
