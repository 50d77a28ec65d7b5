//! domain_audit library: concurrent DNS verification of domain lists
//!
//! This library checks, for every domain in a list, whether its name servers,
//! A records and mail exchangers point at an expected hosting setup, and whether
//! it publishes valid SPF, DMARC and DKIM records. Lookups run concurrently under
//! a bounded concurrency cap, with per-query timeouts, retries with backoff, a
//! per-domain deadline and a resumable checkpoint.
//!
//! # Example
//!
//! ```no_run
//! use domain_audit::{Config, run_audit};
//! use tokio;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file: std::path::PathBuf::from("domains.csv"),
//!     target_ns: vec!["ns1.host.example".to_string(), "ns2.host.example".to_string()],
//!     target_a: vec!["203.0.113.10".to_string()],
//!     max_concurrency: 50,
//!     ..Default::default()
//! };
//!
//! let report = run_audit(config).await?;
//! println!("Audited {} domains: {} matched, {} broken",
//!          report.probed, report.matched, report.broken);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod app;
pub mod config;
pub mod dns;
mod domain;
mod error_handling;
pub mod export;
pub mod initialization;
pub mod input;
pub mod probe;
pub mod record;
mod run;
pub mod scheduler;
pub mod storage;

// Re-export public API
pub use app::{AuditSummary, DisplayLabels};
pub use config::{Config, ConfigError, LogFormat, LogLevel};
pub use dns::{
    execute_query, DnsAnswer, DnsResolver, DnsResponse, HickoryResolver, QueryFailure,
    QueryOutcome, RecordKind, ResolverError, RetryPolicy,
};
pub use domain::{normalize_domain, DomainError};
pub use error_handling::{ErrorType, InitializationError, ProbeError, ProcessingStats};
pub use export::append_results;
pub use input::read_domains;
pub use probe::{
    probe, probe_domain, DkimSelectorResult, DomainCheckResult, ProbeContext, ProbeOutcome,
    ProbeSettings, Targets,
};
pub use run::{run_audit, AuditReport};
pub use scheduler::{BatchReport, BatchRunner, ProgressCallback};
pub use storage::CheckpointStore;
