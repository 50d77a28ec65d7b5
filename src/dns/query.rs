//! Timed query execution with retry and exponential backoff.
//!
//! `execute_query` wraps one resolver call in a per-attempt timeout and drives it
//! with `tokio_retry::RetryIf` over an exponential delay schedule. It separates three outcomes:
//! - an answer (possibly empty),
//! - a recoverable failure after all attempts (`QueryOutcome::Failed`),
//! - a reason to abandon the whole domain (`Err(ProbeError)`: fatal resolver
//!   error or external cancellation).

use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_util::sync::CancellationToken;

use crate::error_handling::{ErrorType, ProbeError};

use super::types::{DnsResolver, DnsResponse, RecordKind, ResolverError};

/// Timeout and retry parameters applied to every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Timeout of a single attempt
    pub timeout: Duration,
    /// Total attempts, initial one included (values below 1 are treated as 1)
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubled after each further one
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt` (1-indexed): `base_delay * 2^(attempt-1)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// A query that failed on every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFailure {
    /// Category of the last failure
    pub kind: ErrorType,
    /// Human-readable description, prefixed with the query label
    pub message: String,
}

/// Result of a query that did not abort the domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The resolver answered (possibly with zero answers).
    Answered(DnsResponse),
    /// Every attempt failed with a retryable error or timed out.
    Failed(QueryFailure),
}

impl QueryOutcome {
    /// Splits into `(response, error)`; exactly one side is `Some`.
    pub fn into_parts(self) -> (Option<DnsResponse>, Option<String>) {
        match self {
            QueryOutcome::Answered(response) => (Some(response), None),
            QueryOutcome::Failed(failure) => (None, Some(failure.message)),
        }
    }
}

/// One failed attempt.
#[derive(Debug)]
enum AttemptError {
    TimedOut,
    Resolver(ResolverError),
}

impl AttemptError {
    fn is_retryable(&self) -> bool {
        !matches!(self, AttemptError::Resolver(e) if e.is_fatal())
    }
}

/// Issues `kind` for `name` under `policy`, retrying transient failures.
///
/// `label` tags every log line and failure message (e.g. `"MX example.com"`).
///
/// # Errors
///
/// - `ProbeError::Fatal` when the resolver reports a non-retryable error
/// - `ProbeError::Cancelled` when `cancel` fires during a query or a backoff delay
pub async fn execute_query(
    resolver: &dyn DnsResolver,
    name: &str,
    kind: RecordKind,
    label: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<QueryOutcome, ProbeError> {
    let max_attempts = policy.attempts();
    // One delay per retry: max_attempts - 1 of them
    let strategy = (1..max_attempts).map(|attempt| policy.backoff_delay(attempt));

    let mut attempt = 0u32;
    let action = move || {
        attempt += 1;
        let attempt = attempt;
        async move {
            match tokio::time::timeout(policy.timeout, resolver.query(name, kind)).await {
                Ok(Ok(response)) => {
                    log::debug!(
                        "{label}: {} answer(s) on attempt {attempt}",
                        response.answers.len()
                    );
                    Ok(response)
                }
                Ok(Err(e)) => {
                    let error = AttemptError::Resolver(e);
                    log_attempt_failure(label, &error, attempt, policy);
                    Err(error)
                }
                Err(_) => {
                    let error = AttemptError::TimedOut;
                    log_attempt_failure(label, &error, attempt, policy);
                    Err(error)
                }
            }
        }
    };

    let retried = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            log::warn!("{label}: cancelled");
            return Err(ProbeError::Cancelled);
        }
        result = RetryIf::spawn(strategy, action, AttemptError::is_retryable) => result,
    };

    match retried {
        Ok(response) => Ok(QueryOutcome::Answered(response)),
        Err(AttemptError::Resolver(e)) if e.is_fatal() => {
            Err(ProbeError::Fatal(format!("{label}: {e}")))
        }
        Err(AttemptError::Resolver(e)) => Ok(QueryOutcome::Failed(QueryFailure {
            kind: error_type_for(&e),
            message: format!("{label}: {e}"),
        })),
        Err(AttemptError::TimedOut) => Ok(QueryOutcome::Failed(QueryFailure {
            kind: ErrorType::DnsQueryTimeout,
            message: timeout_message(label, policy),
        })),
    }
}

fn timeout_message(label: &str, policy: &RetryPolicy) -> String {
    format!("{label}: timed out after {}ms", policy.timeout.as_millis())
}

fn log_attempt_failure(label: &str, error: &AttemptError, attempt: u32, policy: &RetryPolicy) {
    let message = match error {
        AttemptError::TimedOut => timeout_message(label, policy),
        AttemptError::Resolver(e) if e.is_fatal() => {
            log::warn!("{label}: {e}; abandoning domain");
            return;
        }
        AttemptError::Resolver(e) => format!("{label}: {e}"),
    };
    let max_attempts = policy.attempts();
    if attempt >= max_attempts {
        log::warn!(
            "{message} (giving up after {max_attempts} attempt{})",
            if max_attempts == 1 { "" } else { "s" }
        );
    } else {
        log::warn!(
            "{message} (attempt {attempt}/{max_attempts}, retrying in {}ms)",
            policy.backoff_delay(attempt).as_millis()
        );
    }
}

fn error_type_for(error: &ResolverError) -> ErrorType {
    match error {
        ResolverError::Timeout => ErrorType::DnsQueryTimeout,
        ResolverError::Transport(_) => ErrorType::DnsTransportError,
        ResolverError::Protocol(_) => ErrorType::DnsProtocolError,
        ResolverError::Internal(_) | ResolverError::Fatal(_) => ErrorType::DnsResolverError,
    }
}
