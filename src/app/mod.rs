//! Main application modules.
//!
//! This module provides progress logging and rendering, shutdown handling, the
//! retry prompt and statistics printing used by the audit runner.

pub mod logging;
pub mod progress;
pub mod prompt;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::log_progress;
pub use progress::ProgressBar;
pub use prompt::confirm_retry;
pub use shutdown::{shutdown_gracefully, spawn_ctrl_c_listener};
pub use statistics::{print_error_statistics, print_summary, AuditSummary, DisplayLabels};
