//! Flattened CSV row for one domain result.

use serde::Serialize;

use crate::probe::DomainCheckResult;

const LIST_SEPARATOR: &str = "; ";

/// One output row; list fields are joined with `"; "`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct ResultRow {
    pub domain: String,
    pub ns_records: String,
    pub a_records: String,
    pub mx_records: String,
    pub ns_match: bool,
    pub a_match: bool,
    pub mx_match: bool,
    pub spf_record: Option<String>,
    pub spf_valid: bool,
    pub dmarc_record: Option<String>,
    pub dmarc_valid: bool,
    /// `selector:valid` / `selector:invalid` per DKIM-formatted selector
    pub dkim_selectors: String,
    pub dkim_valid: bool,
    pub is_broken: bool,
    pub error_reason: Option<String>,
    pub query_errors: String,
    pub checked_at: String,
}

impl ResultRow {
    pub(crate) fn new(result: &DomainCheckResult, checked_at: &str) -> Self {
        let dkim_selectors = result
            .dkim_selector_results
            .iter()
            .map(|(selector, status)| {
                format!(
                    "{selector}:{}",
                    if status.valid { "valid" } else { "invalid" }
                )
            })
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);

        Self {
            domain: result.domain.clone(),
            ns_records: result.ns_records.join(LIST_SEPARATOR),
            a_records: result.a_records.join(LIST_SEPARATOR),
            mx_records: result.mx_records.join(LIST_SEPARATOR),
            ns_match: result.ns_match,
            a_match: result.a_match,
            mx_match: result.mx_match,
            spf_record: result.spf_record.clone(),
            spf_valid: result.spf_valid,
            dmarc_record: result.dmarc_record.clone(),
            dmarc_valid: result.dmarc_valid,
            dkim_selectors,
            dkim_valid: result.dkim_valid,
            is_broken: result.is_broken,
            error_reason: result.error_reason.clone(),
            query_errors: result.query_errors.join(LIST_SEPARATOR),
            checked_at: checked_at.to_string(),
        }
    }
}
