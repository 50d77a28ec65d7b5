//! Match evaluation against expected infrastructure.

use std::collections::HashSet;

use super::normalize_host;

/// True when any NS record equals (case-insensitively) any target NS.
pub fn ns_match(records: &[String], targets: &[String]) -> bool {
    let targets: HashSet<String> = targets
        .iter()
        .map(|t| normalize_host(t))
        .filter(|t| !t.is_empty())
        .collect();
    records.iter().any(|r| targets.contains(&normalize_host(r)))
}

/// True when the A records and target addresses intersect, ignoring case and order.
pub fn a_match(records: &[String], targets: &[String]) -> bool {
    let targets: HashSet<String> = targets
        .iter()
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    records
        .iter()
        .any(|r| targets.contains(&r.trim().to_ascii_lowercase()))
}

/// True when any MX record contains any target MX as a substring.
///
/// Containment rather than equality: a target of `mail.host.example` matches an
/// MX of `eu.mail.host.example`. Without targets there is nothing to match.
pub fn mx_match(records: &[String], targets: Option<&[String]>) -> bool {
    let Some(targets) = targets else {
        return false;
    };
    let targets: Vec<String> = targets
        .iter()
        .map(|t| normalize_host(t))
        .filter(|t| !t.is_empty())
        .collect();
    records.iter().any(|record| {
        let record = normalize_host(record);
        targets.iter().any(|target| record.contains(target.as_str()))
    })
}
