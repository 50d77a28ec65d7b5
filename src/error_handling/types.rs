//! Error type definitions.
//!
//! This module defines the fatal per-domain error, initialization errors and the
//! categories counted by `ProcessingStats`.

use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),
}

/// A failure that prevents any further data being produced for a domain.
///
/// Per-query failures never become a `ProbeError`; they are recorded in
/// `DomainCheckResult::query_errors` and the probe continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The input could not be normalized into a hostname.
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// The resolver reported an error of the non-retryable class.
    #[error("fatal resolver error: {0}")]
    Fatal(String),

    /// The per-domain deadline expired before all queries finished.
    #[error("domain deadline exceeded after {}ms", .0.as_millis())]
    DeadlineExceeded(Duration),

    /// The run was cancelled from outside (e.g. Ctrl-C).
    #[error("probe cancelled")]
    Cancelled,

    /// The task running the probe panicked or was aborted.
    #[error("probe task failed: {0}")]
    TaskFailed(String),
}

impl ProbeError {
    /// Statistics category for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ProbeError::InvalidDomain(_) => ErrorType::InvalidDomain,
            ProbeError::Fatal(_) => ErrorType::FatalResolverError,
            ProbeError::DeadlineExceeded(_) => ErrorType::DomainDeadlineExceeded,
            ProbeError::Cancelled => ErrorType::ProbeCancelled,
            ProbeError::TaskFailed(_) => ErrorType::ProbeTaskPanic,
        }
    }
}

/// Types of errors that can occur while auditing domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Per-query errors (recorded, domain continues)
    /// Every attempt of a query timed out
    DnsQueryTimeout,
    /// Socket-level failure
    DnsTransportError,
    /// Malformed or unexpected response
    DnsProtocolError,
    /// Server failure or other resolver-side error
    DnsResolverError,
    // Per-domain errors (domain marked broken)
    /// Resolver unusable; domain abandoned
    FatalResolverError,
    /// Per-domain deadline expired
    DomainDeadlineExceeded,
    /// Run cancelled while the domain was in flight
    ProbeCancelled,
    /// Input is not a usable domain name
    InvalidDomain,
    /// Probe task panicked
    ProbeTaskPanic,
    // Resource errors (logged, run continues)
    /// Checkpoint append failed
    CheckpointWriteError,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Human-readable category name used in the statistics table.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::DnsQueryTimeout => "DNS query timeout",
            ErrorType::DnsTransportError => "DNS transport error",
            ErrorType::DnsProtocolError => "DNS protocol error",
            ErrorType::DnsResolverError => "DNS resolver error",
            ErrorType::FatalResolverError => "Fatal resolver error",
            ErrorType::DomainDeadlineExceeded => "Domain deadline exceeded",
            ErrorType::ProbeCancelled => "Probe cancelled",
            ErrorType::InvalidDomain => "Invalid domain",
            ErrorType::ProbeTaskPanic => "Probe task panicked",
            ErrorType::CheckpointWriteError => "Checkpoint write error",
        }
    }

    /// True for categories that mark a domain broken.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorType::FatalResolverError
                | ErrorType::DomainDeadlineExceeded
                | ErrorType::ProbeCancelled
                | ErrorType::InvalidDomain
                | ErrorType::ProbeTaskPanic
        )
    }
}
