//! In-process resolvers for unit tests.
//!
//! None of these touch the network; answers are scripted per (name, kind).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::types::{DnsAnswer, DnsResolver, DnsResponse, RecordKind, ResolverError};

/// Answers from a fixed table; unknown names get an empty answer (NODATA).
#[derive(Default)]
pub struct StaticResolver {
    answers: HashMap<(String, RecordKind), Result<DnsResponse, ResolverError>>,
    calls: AtomicUsize,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, name: &str, kind: RecordKind, answers: Vec<DnsAnswer>) -> Self {
        self.answers
            .insert((name.to_string(), kind), Ok(DnsResponse::new(answers)));
        self
    }

    pub fn with_ns(self, name: &str, hosts: &[&str]) -> Self {
        let answers = hosts.iter().map(|h| DnsAnswer::Ns(h.to_string())).collect();
        self.with(name, RecordKind::Ns, answers)
    }

    pub fn with_a(self, name: &str, addresses: &[&str]) -> Self {
        let answers = addresses
            .iter()
            .map(|a| DnsAnswer::A(a.to_string()))
            .collect();
        self.with(name, RecordKind::A, answers)
    }

    pub fn with_mx(self, name: &str, exchanges: &[&str]) -> Self {
        let answers = exchanges
            .iter()
            .enumerate()
            .map(|(i, exchange)| DnsAnswer::Mx {
                preference: (i as u16 + 1) * 10,
                exchange: exchange.to_string(),
            })
            .collect();
        self.with(name, RecordKind::Mx, answers)
    }

    /// One TXT record per inner slice, each slice being its character-strings.
    pub fn with_txt(self, name: &str, records: &[&[&str]]) -> Self {
        let answers = records
            .iter()
            .map(|strings| DnsAnswer::Txt(strings.iter().map(|s| s.to_string()).collect()))
            .collect();
        self.with(name, RecordKind::Txt, answers)
    }

    pub fn with_error(mut self, name: &str, kind: RecordKind, error: ResolverError) -> Self {
        self.answers.insert((name.to_string(), kind), Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsResolver for StaticResolver {
    async fn query(&self, name: &str, kind: RecordKind) -> Result<DnsResponse, ResolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(&(name.to_string(), kind))
            .cloned()
            .unwrap_or_else(|| Ok(DnsResponse::empty()))
    }
}

/// Fails with a transport error for the first `failures` calls, then answers.
pub struct FlakyResolver {
    failures: usize,
    response: DnsResponse,
    calls: AtomicUsize,
}

impl FlakyResolver {
    pub fn new(failures: usize, response: DnsResponse) -> Self {
        Self {
            failures,
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsResolver for FlakyResolver {
    async fn query(&self, _name: &str, _kind: RecordKind) -> Result<DnsResponse, ResolverError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(ResolverError::Transport("connection reset".to_string()))
        } else {
            Ok(self.response.clone())
        }
    }
}

/// Never answers.
pub struct HangingResolver;

#[async_trait]
impl DnsResolver for HangingResolver {
    async fn query(&self, _name: &str, _kind: RecordKind) -> Result<DnsResponse, ResolverError> {
        std::future::pending().await
    }
}
