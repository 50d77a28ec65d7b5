// Shared test helpers: scripted resolvers and probe contexts.
//
// None of these touch the network; every answer is set up per test.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use domain_audit::{
    DnsAnswer, DnsResolver, DnsResponse, ProbeContext, ProbeSettings, RecordKind, ResolverError,
    RetryPolicy, Targets,
};

/// Target name servers used across the integration tests.
#[allow(dead_code)]
pub const TARGET_NS: &[&str] = &["ns1.host.example", "ns2.host.example"];
/// Target web front-end address.
#[allow(dead_code)]
pub const TARGET_A: &str = "203.0.113.10";

/// Resolver answering from a table; unknown names get an empty answer.
#[derive(Default)]
pub struct ScriptedResolver {
    answers: HashMap<(String, RecordKind), Result<DnsResponse, ResolverError>>,
    hanging: Vec<String>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, name: &str, kind: RecordKind, answers: Vec<DnsAnswer>) -> Self {
        self.answers
            .insert((name.to_string(), kind), Ok(DnsResponse::new(answers)));
        self
    }

    pub fn fail(mut self, name: &str, kind: RecordKind, error: ResolverError) -> Self {
        self.answers.insert((name.to_string(), kind), Err(error));
        self
    }

    /// Every query for `name` never completes.
    pub fn hang(mut self, name: &str) -> Self {
        self.hanging.push(name.to_string());
        self
    }

    /// A fully configured domain: target NS and A, SPF, DMARC and a DKIM key.
    pub fn healthy_domain(self, domain: &str) -> Self {
        self.answer(
            domain,
            RecordKind::Ns,
            TARGET_NS.iter().map(|ns| DnsAnswer::Ns(format!("{ns}."))).collect(),
        )
        .answer(domain, RecordKind::A, vec![DnsAnswer::A(TARGET_A.to_string())])
        .answer(
            domain,
            RecordKind::Mx,
            vec![DnsAnswer::Mx {
                preference: 10,
                exchange: "mx1.mail.example.".to_string(),
            }],
        )
        .answer(
            domain,
            RecordKind::Txt,
            vec![DnsAnswer::Txt(vec![
                "v=spf1 include:_spf.mail.example ".to_string(),
                "-all".to_string(),
            ])],
        )
        .answer(
            &format!("_dmarc.{domain}"),
            RecordKind::Txt,
            vec![DnsAnswer::Txt(vec![
                "v=DMARC1; p=reject; rua=mailto:dmarc@mail.example".to_string(),
            ])],
        )
        .answer(
            &format!("default._domainkey.{domain}"),
            RecordKind::Txt,
            vec![DnsAnswer::Txt(vec!["v=DKIM1; k=rsa; p=MIGfMA0GCSq".to_string()])],
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsResolver for ScriptedResolver {
    async fn query(&self, name: &str, kind: RecordKind) -> Result<DnsResponse, ResolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hanging.iter().any(|hanging| hanging == name || name.ends_with(&format!(".{hanging}"))) {
            std::future::pending::<()>().await;
        }
        self.answers
            .get(&(name.to_string(), kind))
            .cloned()
            .unwrap_or_else(|| Ok(DnsResponse::empty()))
    }
}

/// Probe settings with short timeouts and a single DKIM selector.
#[allow(dead_code)]
pub fn test_settings(domain_timeout: Duration) -> ProbeSettings {
    ProbeSettings {
        targets: Targets {
            ns: TARGET_NS.iter().map(|ns| ns.to_string()).collect(),
            a: vec![TARGET_A.to_string()],
            mx: Some(vec!["mail.example".to_string()]),
        },
        retry: RetryPolicy {
            timeout: Duration::from_millis(200),
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
        },
        domain_timeout,
        dkim_selectors: vec!["default".to_string(), "selector1".to_string()],
    }
}

/// Probe context over `resolver` with `test_settings`.
#[allow(dead_code)]
pub fn test_context(resolver: Arc<dyn DnsResolver>, domain_timeout: Duration) -> Arc<ProbeContext> {
    Arc::new(ProbeContext::new(resolver, test_settings(domain_timeout)))
}
