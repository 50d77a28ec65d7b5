//! Domain prober.
//!
//! Composes the timed query executor across every record a domain audit needs
//! and turns the answers into a `DomainCheckResult`.
//!
//! Two failure levels:
//! - a failed query is recorded in `query_errors` and the probe continues
//! - a `ProbeError` (invalid input, fatal resolver error, deadline, cancellation)
//!   abandons the domain and marks it broken

mod prober;
mod types;

// Re-export public API
pub use prober::{probe, probe_domain};
pub use types::{
    DkimSelectorResult, DomainCheckResult, ProbeContext, ProbeOutcome, ProbeSettings, Targets,
};
