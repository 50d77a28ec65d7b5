//! Batch scheduler.
//!
//! Fans a domain list out to the prober under a concurrency cap, filters and
//! records checkpointed domains, reports progress through an injected callback
//! and collects results plus the broken-domain list.

mod resources;
mod runner;
mod task;

// Re-export public API
pub use resources::ProgressCallback;
pub use runner::{BatchReport, BatchRunner};
