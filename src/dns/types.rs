//! Resolver-facing types.
//!
//! The audit core only depends on the `DnsResolver` trait; the hickory adapter
//! and the test resolvers both implement it.

use async_trait::async_trait;
use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// Record types the audit queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RecordKind {
    /// Name server records
    #[strum(serialize = "NS")]
    Ns,
    /// IPv4 address records
    #[strum(serialize = "A")]
    A,
    /// Mail exchanger records
    #[strum(serialize = "MX")]
    Mx,
    /// Text records
    #[strum(serialize = "TXT")]
    Txt,
}

/// One typed answer from a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsAnswer {
    /// Name server host name, as returned (may carry a trailing dot)
    Ns(String),
    /// IPv4 address in dotted form
    A(String),
    /// Mail exchanger with its preference
    Mx {
        /// Lower is preferred
        preference: u16,
        /// Exchange host name, as returned
        exchange: String,
    },
    /// The character-strings of one TXT record, in wire order
    Txt(Vec<String>),
}

/// Answers to a single query, in response order.
///
/// An empty response is a successful answer (NODATA or NXDOMAIN), not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsResponse {
    /// Answer records
    pub answers: Vec<DnsAnswer>,
}

impl DnsResponse {
    /// Wraps a list of answers.
    pub fn new(answers: Vec<DnsAnswer>) -> Self {
        Self { answers }
    }

    /// Response without answers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the response carries no answers.
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Raw NS host names.
    pub fn ns_names(&self) -> Vec<String> {
        self.answers
            .iter()
            .filter_map(|answer| match answer {
                DnsAnswer::Ns(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// A addresses as returned.
    pub fn a_addresses(&self) -> Vec<String> {
        self.answers
            .iter()
            .filter_map(|answer| match answer {
                DnsAnswer::A(address) => Some(address.clone()),
                _ => None,
            })
            .collect()
    }

    /// Raw MX exchanges in response order (not sorted by preference).
    pub fn mx_exchanges(&self) -> Vec<String> {
        self.answers
            .iter()
            .filter_map(|answer| match answer {
                DnsAnswer::Mx { exchange, .. } => Some(exchange.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every TXT character-string of every record, flattened in order.
    pub fn txt_fragments(&self) -> Vec<String> {
        self.answers
            .iter()
            .filter_map(|answer| match answer {
                DnsAnswer::Txt(strings) => Some(strings.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// One string per TXT record, its character-strings joined without separator.
    pub fn txt_records(&self) -> Vec<String> {
        self.answers
            .iter()
            .filter_map(|answer| match answer {
                DnsAnswer::Txt(strings) => Some(strings.concat()),
                _ => None,
            })
            .collect()
    }
}

/// Errors a resolver can report for one query.
///
/// Everything except `Fatal` is retried by the query executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// The resolver's own client timeout fired.
    #[error("timed out")]
    Timeout,

    /// Malformed or unexpected response.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Socket-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Any other error raised by the resolver for this query.
    #[error("resolver error: {0}")]
    Internal(String),

    /// The resolver itself is unusable (e.g. no name server connections).
    #[error("resolver unavailable: {0}")]
    Fatal(String),
}

impl ResolverError {
    /// True when retrying cannot help and the domain must be abandoned.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ResolverError::Fatal(_))
    }
}

/// A DNS resolver capability shared by all concurrent probes.
///
/// Implementations must be stateless per query so one instance can serve the
/// whole batch.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Issues one query of `kind` for `name` (no trailing dot required).
    async fn query(&self, name: &str, kind: RecordKind) -> Result<DnsResponse, ResolverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_response() -> DnsResponse {
        DnsResponse::new(vec![
            DnsAnswer::Txt(vec!["v=spf1 ".to_string(), "-all".to_string()]),
            DnsAnswer::Txt(vec!["google-site-verification=abc".to_string()]),
            DnsAnswer::Mx {
                preference: 20,
                exchange: "mx2.example.com.".to_string(),
            },
            DnsAnswer::Mx {
                preference: 10,
                exchange: "mx1.example.com.".to_string(),
            },
        ])
    }

    #[test]
    fn test_txt_fragments_are_flattened_in_order() {
        assert_eq!(
            mixed_response().txt_fragments(),
            vec!["v=spf1 ", "-all", "google-site-verification=abc"]
        );
    }

    #[test]
    fn test_txt_records_join_character_strings() {
        assert_eq!(
            mixed_response().txt_records(),
            vec!["v=spf1 -all", "google-site-verification=abc"]
        );
    }

    #[test]
    fn test_mx_exchanges_keep_response_order() {
        assert_eq!(
            mixed_response().mx_exchanges(),
            vec!["mx2.example.com.", "mx1.example.com."]
        );
    }

    #[test]
    fn test_empty_response() {
        let response = DnsResponse::empty();
        assert!(response.is_empty());
        assert!(response.ns_names().is_empty());
        assert!(response.txt_fragments().is_empty());
    }

    #[test]
    fn test_record_kind_display() {
        assert_eq!(RecordKind::Ns.to_string(), "NS");
        assert_eq!(RecordKind::Txt.to_string(), "TXT");
    }

    #[test]
    fn test_only_fatal_resolver_errors_are_fatal() {
        assert!(ResolverError::Fatal("no connections".into()).is_fatal());
        assert!(!ResolverError::Timeout.is_fatal());
        assert!(!ResolverError::Transport("reset".into()).is_fatal());
        assert!(!ResolverError::Protocol("bad label".into()).is_fatal());
        assert!(!ResolverError::Internal("servfail".into()).is_fatal());
    }
}
