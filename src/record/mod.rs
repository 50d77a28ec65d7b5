//! Record interpretation.
//!
//! This module provides:
//! - Host name normalization for NS/MX answers and configured targets
//! - Lightweight SPF, DMARC and DKIM detection (prefix/substring matching, not
//!   full RFC grammars)
//! - NS/A/MX match evaluation against the expected infrastructure

mod email_auth;
mod matching;

// Re-export public API
pub use email_auth::{dkim_record_status, dmarc_is_valid, extract_dmarc, extract_spf, spf_is_valid};
pub use matching::{a_match, mx_match, ns_match};

/// Lower-cases a host name and strips surrounding whitespace and the root dot.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    host.strip_suffix('.').unwrap_or(host).to_ascii_lowercase()
}

/// Applies `normalize_host` to every entry, keeping order and duplicates.
pub fn normalize_hosts(hosts: &[String]) -> Vec<String> {
    hosts.iter().map(|host| normalize_host(host)).collect()
}
