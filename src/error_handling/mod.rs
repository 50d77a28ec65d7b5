//! Error handling and processing statistics.
//!
//! This module provides:
//! - The fatal per-domain error (`ProbeError`) and initialization errors
//! - Error categories (`ErrorType`) and thread-safe counters (`ProcessingStats`)
//!
//! Per-query failures are retried and then recorded on the domain result; only
//! `ProbeError` marks a domain broken.

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{ErrorType, InitializationError, ProbeError};
