//! Configuration constants.
//!
//! This module defines the defaults and hard limits used throughout the application:
//! timeouts, retry policy, concurrency and file locations.

/// Default number of concurrent domain probes (semaphore limit)
pub const DEFAULT_MAX_CONCURRENCY: usize = 20;
/// Upper bound accepted for `--max-concurrency`
/// Each probe issues up to 14 queries at once, so 500 probes is already ~7k queries in flight
pub const MAX_CONCURRENCY_LIMIT: usize = 500;
/// Progress log interval in seconds
pub const LOGGING_INTERVAL: u64 = 5;

// Query timeouts
/// Per-query timeout in milliseconds
/// Most authoritative answers arrive in <200ms; 3s leaves room for slow upstreams
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 3000;
/// Per-domain deadline in seconds
/// Formula: 3 attempts * 3s + backoff (0.5s + 1s) + buffer = ~15s; doubled for DKIM fan-out
pub const DEFAULT_DOMAIN_TIMEOUT_SECS: u64 = 30;

// Retry strategy
/// Maximum number of attempts per query (including the initial attempt)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Upper bound accepted for `--max-attempts`
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;
/// Delay before the first retry; doubled on each further attempt
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// DNS port used for explicitly configured name servers
pub const DNS_PORT: u16 = 53;

/// Default results file
pub const DEFAULT_OUTPUT_PATH: &str = "./domain_audit.csv";
/// Default resume checkpoint file
pub const DEFAULT_CHECKPOINT_PATH: &str = "./.domain_audit.checkpoint";

/// Width of the progress bar in characters (excluding counters)
pub const PROGRESS_BAR_WIDTH: usize = 40;

/// Common DKIM selectors probed when none are configured.
///
/// Covers the usual provider defaults (Microsoft 365 uses `selector1`/`selector2`,
/// Google Workspace uses `google`, most panels use `default`, `dkim` or `mail`).
pub const DEFAULT_DKIM_SELECTORS: &[&str] = &[
    "default",
    "selector1",
    "selector2",
    "dkim",
    "google",
    "mail",
    "smtp",
    "key1",
    "key2",
];
