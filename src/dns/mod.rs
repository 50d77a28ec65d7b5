//! DNS resolution and timed query execution.
//!
//! This module provides:
//! - The `DnsResolver` capability the audit core depends on, with its response
//!   and error types
//! - `HickoryResolver`, the production implementation on `hickory-resolver`
//! - `execute_query`, which adds per-attempt timeouts, retries with exponential
//!   backoff and cancellation on top of a single resolver call

mod hickory;
mod query;
mod types;

// Re-export public API
pub use hickory::HickoryResolver;
pub use query::{execute_query, QueryFailure, QueryOutcome, RetryPolicy};
pub use types::{DnsAnswer, DnsResolver, DnsResponse, RecordKind, ResolverError};

#[cfg(test)]
pub(crate) mod test_helpers;
