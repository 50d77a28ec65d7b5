//! Audit run orchestration.
//!
//! Wires configuration, input, resolver, scheduler, CSV output, the optional
//! retry pass and the final summary together.

mod finalize;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::app::{
    confirm_retry, log_progress, shutdown_gracefully, spawn_ctrl_c_listener, DisplayLabels,
    ProgressBar,
};
use crate::config::{Config, LOGGING_INTERVAL, PROGRESS_BAR_WIDTH};
use crate::export::append_results;
use crate::initialization::init_resolver;
use crate::input::read_domains;
use crate::probe::ProbeContext;
use crate::scheduler::BatchRunner;
use crate::storage::CheckpointStore;

use finalize::finalize_audit;

/// Results of an audit run.
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// Domains read from the input (before deduplication)
    pub domains_read: usize,
    /// Domains with a result in this run
    pub probed: usize,
    /// Domains skipped because the checkpoint lists them
    pub skipped: usize,
    /// Domains never started because the run was interrupted
    pub unscheduled: usize,
    /// Domains whose NS and A records both match the targets
    pub matched: usize,
    /// Domains still broken after the optional retry pass
    pub broken: usize,
    /// Domains probed a second time by the retry pass
    pub retried: usize,
    /// CSV file the rows were appended to
    pub output: PathBuf,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Shared progress counters, fed by the scheduler's progress callback.
#[derive(Default)]
struct ProgressCounters {
    completed: AtomicUsize,
    broken: AtomicUsize,
    total: AtomicUsize,
}

/// Runs a domain audit with the provided configuration.
///
/// This is the main entry point for the library. It reads domains from the input
/// file, probes them concurrently, appends one CSV row per domain to the output
/// file and optionally retries broken domains once.
///
/// # Errors
///
/// This function will return an error if:
/// - The configuration is invalid
/// - The input file cannot be opened
/// - The resolver cannot be built
/// - The output file or checkpoint cannot be written
///
/// # Example
///
/// ```no_run
/// use domain_audit::{run_audit, Config};
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config {
///     file: PathBuf::from("domains.csv"),
///     target_ns: vec!["ns1.host.example".to_string()],
///     ..Default::default()
/// };
/// let report = run_audit(config).await?;
/// println!("{} of {} domains matched", report.matched, report.probed);
/// # Ok(())
/// # }
/// ```
pub async fn run_audit(config: Config) -> Result<AuditReport> {
    config.validate().context("Invalid configuration")?;
    let labels = DisplayLabels::new(config.display_labels()?);

    let domains = read_domains(&config.file)?;
    let resolver = init_resolver(&config).context("Failed to initialize DNS resolver")?;
    let ctx = Arc::new(ProbeContext::new(resolver, config.probe_settings()));

    let store = Arc::new(CheckpointStore::new(config.checkpoint.clone()));
    if config.reset_checkpoint {
        store.clear().await.with_context(|| {
            format!("Failed to reset checkpoint {}", store.path().display())
        })?;
        info!("Checkpoint {} cleared", store.path().display());
    }

    // Fail before probing if results could not be saved
    append_results(&config.output, &[], false).context("Output file is not writable")?;

    let start_time = Instant::now();

    let counters = Arc::new(ProgressCounters::default());
    let bar = (!config.no_progress && std::io::stderr().is_terminal())
        .then(|| Arc::new(ProgressBar::new(PROGRESS_BAR_WIDTH)));
    let progress = {
        let counters = Arc::clone(&counters);
        let bar = bar.clone();
        move |completed: usize, broken: usize, total: usize| {
            counters.completed.store(completed, Ordering::SeqCst);
            counters.broken.store(broken, Ordering::SeqCst);
            counters.total.store(total, Ordering::SeqCst);
            if let Some(bar) = &bar {
                bar.update(completed, broken, total);
            }
        }
    };

    let runner = BatchRunner::new(Arc::clone(&ctx), config.max_concurrency)
        .with_checkpoint(Arc::clone(&store))
        .with_progress(Arc::new(progress));
    let cancel = runner.cancellation_token();
    let ctrl_c = spawn_ctrl_c_listener(cancel.clone());

    let logging_cancel = CancellationToken::new();
    let logging_task = bar.is_none().then(|| {
        spawn_progress_logger(start_time, Arc::clone(&counters), logging_cancel.child_token())
    });

    let report = runner.run_batch(&domains, config.resume).await;
    if let Some(bar) = &bar {
        bar.finish();
    }
    append_results(&config.output, &report.results, !config.no_header)
        .context("Failed to write results")?;

    let mut retried = Vec::new();
    if !report.broken.is_empty()
        && !cancel.is_cancelled()
        && should_retry(&config, report.broken.len()).await
    {
        let retry = runner.retry_broken(&report.results).await;
        if let Some(bar) = &bar {
            bar.finish();
        }
        append_results(&config.output, &retry.results, !config.no_header)
            .context("Failed to write retried results")?;
        retried = retry.results;
    }

    shutdown_gracefully(logging_cancel, logging_task).await;
    ctrl_c.abort();
    log_progress(start_time, &counters.completed, &counters.broken, &counters.total);

    Ok(finalize_audit(
        domains.len(),
        &report,
        &retried,
        &labels,
        &ctx.stats,
        config.output.clone(),
        start_time,
    ))
}

async fn should_retry(config: &Config, broken: usize) -> bool {
    if config.retry_broken {
        return true;
    }
    tokio::task::spawn_blocking(move || confirm_retry(broken))
        .await
        .unwrap_or(false)
}

fn spawn_progress_logger(
    start_time: Instant,
    counters: Arc<ProgressCounters>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    log_progress(start_time, &counters.completed, &counters.broken, &counters.total);
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }
    })
}
