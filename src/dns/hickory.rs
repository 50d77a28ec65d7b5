//! `DnsResolver` implementation backed by `hickory-resolver`.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;

use crate::config::DNS_PORT;

use super::types::{DnsAnswer, DnsResolver, DnsResponse, RecordKind, ResolverError};

impl From<RecordKind> for RecordType {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Ns => RecordType::NS,
            RecordKind::A => RecordType::A,
            RecordKind::Mx => RecordType::MX,
            RecordKind::Txt => RecordType::TXT,
        }
    }
}

/// Resolver adapter over a shared `TokioAsyncResolver`.
pub struct HickoryResolver {
    inner: TokioAsyncResolver,
}

impl HickoryResolver {
    /// Wraps an already configured resolver.
    pub fn new(inner: TokioAsyncResolver) -> Self {
        Self { inner }
    }

    /// Builds a resolver that queries `nameservers` (or the default upstreams when empty).
    ///
    /// Hickory's own retries are disabled (`attempts = 1`): the query executor owns
    /// the retry and backoff policy. `timeout` is the client-side timeout of one attempt.
    pub fn with_nameservers(nameservers: &[IpAddr], timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        // No search-domain appending: every name we query is already fully qualified
        opts.ndots = 0;

        let config = if nameservers.is_empty() {
            ResolverConfig::default()
        } else {
            ResolverConfig::from_parts(
                None,
                Vec::new(),
                NameServerConfigGroup::from_ips_clear(nameservers, DNS_PORT, true),
            )
        };

        Self::new(TokioAsyncResolver::tokio(config, opts))
    }
}

#[async_trait]
impl DnsResolver for HickoryResolver {
    async fn query(&self, name: &str, kind: RecordKind) -> Result<DnsResponse, ResolverError> {
        let fqdn = if name.ends_with('.') {
            name.to_string()
        } else {
            format!("{name}.")
        };
        match self.inner.lookup(fqdn.as_str(), kind.into()).await {
            Ok(lookup) => Ok(DnsResponse::new(
                lookup.iter().filter_map(answer_from_rdata).collect(),
            )),
            Err(e) => classify_error(e),
        }
    }
}

fn answer_from_rdata(rdata: &RData) -> Option<DnsAnswer> {
    match rdata {
        RData::NS(ns) => Some(DnsAnswer::Ns(ns.to_utf8())),
        RData::A(a) => Some(DnsAnswer::A(a.0.to_string())),
        RData::MX(mx) => Some(DnsAnswer::Mx {
            preference: mx.preference(),
            exchange: mx.exchange().to_utf8(),
        }),
        RData::TXT(txt) => Some(DnsAnswer::Txt(
            txt.iter()
                .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                .collect(),
        )),
        // CNAMEs in the chain and anything unexpected are not answers to our question
        _ => None,
    }
}

/// Maps hickory errors onto the retry taxonomy.
///
/// Hickory reports every negative response as "no records found". Only NOERROR
/// (NODATA) and NXDOMAIN are empty answers; SERVFAIL, REFUSED and the other
/// codes are server failures and are retried.
fn classify_error(error: ResolveError) -> Result<DnsResponse, ResolverError> {
    match error.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match response_code {
            ResponseCode::NoError | ResponseCode::NXDomain => Ok(DnsResponse::empty()),
            code => Err(ResolverError::Internal(format!("server answered {code}"))),
        },
        ResolveErrorKind::Timeout => Err(ResolverError::Timeout),
        ResolveErrorKind::Io(io) => Err(ResolverError::Transport(io.to_string())),
        ResolveErrorKind::Proto(proto) => Err(ResolverError::Protocol(proto.to_string())),
        ResolveErrorKind::NoConnections => Err(ResolverError::Fatal(error.to_string())),
        _ => Err(ResolverError::Internal(error.to_string())),
    }
}
