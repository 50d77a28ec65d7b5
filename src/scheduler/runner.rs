//! Batch scheduling of domain probes.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::domain::normalize_domain;
use crate::error_handling::ProbeError;
use crate::probe::{DomainCheckResult, ProbeContext};
use crate::storage::CheckpointStore;

use super::resources::{ProgressCallback, RunState};
use super::task::{process_domain_task, DomainTaskParams};

/// What a batch run produced.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One result per probed or rejected domain, in completion order
    pub results: Vec<DomainCheckResult>,
    /// Domains marked broken during this run
    pub broken: Vec<String>,
    /// Domains skipped because the checkpoint lists them
    pub skipped: Vec<String>,
    /// Domains never started because the run was cancelled
    pub unscheduled: Vec<String>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl BatchReport {
    /// Results marked broken.
    pub fn broken_results(&self) -> impl Iterator<Item = &DomainCheckResult> {
        self.results.iter().filter(|r| r.is_broken)
    }
}

/// Runs probes over a domain list with bounded parallelism.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use domain_audit::{BatchRunner, Config, HickoryResolver, ProbeContext};
///
/// # async fn example() {
/// let config = Config::default();
/// let resolver = Arc::new(HickoryResolver::with_nameservers(&[], config.query_timeout()));
/// let ctx = Arc::new(ProbeContext::new(resolver, config.probe_settings()));
/// let runner = BatchRunner::new(ctx, 10);
/// let report = runner.run_batch(&["example.com".to_string()], false).await;
/// println!("{} broken", report.broken.len());
/// # }
/// ```
pub struct BatchRunner {
    ctx: Arc<ProbeContext>,
    concurrency: usize,
    checkpoint: Option<Arc<CheckpointStore>>,
    progress: ProgressCallback,
    cancel: CancellationToken,
}

impl BatchRunner {
    /// Creates a runner allowing `concurrency` probes in flight (at least one).
    pub fn new(ctx: Arc<ProbeContext>, concurrency: usize) -> Self {
        Self {
            ctx,
            concurrency: concurrency.max(1),
            checkpoint: None,
            progress: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `store` for resume filtering and per-domain checkpointing.
    pub fn with_checkpoint(mut self, store: Arc<CheckpointStore>) -> Self {
        self.checkpoint = Some(store);
        self
    }

    /// Calls `callback(completed, broken, total)` after each finished domain.
    pub fn with_progress(mut self, callback: Arc<dyn Fn(usize, usize, usize) + Send + Sync>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Ties the run to an external cancellation token (e.g. Ctrl-C).
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels every run of this runner.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Shared probe context.
    pub fn context(&self) -> &Arc<ProbeContext> {
        &self.ctx
    }

    /// Probes every domain of `domains`.
    ///
    /// With `resume`, domains listed in the checkpoint are skipped and every
    /// finished domain is appended to it. Without a checkpoint store `resume`
    /// has no effect.
    pub async fn run_batch(&self, domains: &[String], resume: bool) -> BatchReport {
        let checkpoint = if resume {
            if self.checkpoint.is_none() {
                warn!("Resume requested without a checkpoint store; processing every domain");
            }
            self.checkpoint.clone()
        } else {
            None
        };
        self.run(domains, checkpoint).await
    }

    /// Probes again every broken domain of `previous`, without checkpoint writes.
    ///
    /// The returned results are new rows; the caller keeps the previous ones.
    pub async fn retry_broken(&self, previous: &[DomainCheckResult]) -> BatchReport {
        let domains: Vec<String> = previous
            .iter()
            .filter(|r| r.is_broken)
            .map(|r| r.domain.clone())
            .collect();
        info!("Retrying {} broken domain(s)", domains.len());
        self.run(&domains, None).await
    }

    async fn run(&self, domains: &[String], checkpoint: Option<Arc<CheckpointStore>>) -> BatchReport {
        let start = Instant::now();
        let mut report = BatchReport::default();

        let mut rejected = Vec::new();
        let mut pending = Vec::new();
        let mut seen = HashSet::new();
        for raw in domains {
            match normalize_domain(raw) {
                Ok(name) => {
                    if seen.insert(name.clone()) {
                        pending.push(name);
                    } else {
                        debug!("Skipping duplicate domain {name}");
                    }
                }
                Err(e) => {
                    let error = ProbeError::InvalidDomain(e.to_string());
                    warn!("{}: marked broken: {error}", raw.trim());
                    self.ctx.stats.increment_error(error.error_type());
                    rejected.push(DomainCheckResult::invalid(raw, &error));
                }
            }
        }

        if let Some(store) = checkpoint.as_ref() {
            let done = store.load().await;
            if !done.is_empty() {
                let (skip, keep): (Vec<String>, Vec<String>) =
                    pending.into_iter().partition(|d| done.contains(d));
                info!(
                    "Resuming: skipping {} checkpointed domain(s) from {}",
                    skip.len(),
                    store.path().display()
                );
                report.skipped = skip;
                pending = keep;
            }
        }

        let state = Arc::new(RunState::new(
            rejected.len() + pending.len(),
            self.progress.clone(),
        ));
        for result in rejected {
            state.finish(&result.domain, true);
            report.results.push(result);
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = FuturesUnordered::new();
        let mut pending = pending.into_iter();

        while let Some(domain) = pending.next() {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    report.unscheduled.push(domain);
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        warn!("Semaphore closed, not scheduling {domain}");
                        report.unscheduled.push(domain);
                        break;
                    }
                },
            };

            let handle = tokio::spawn(process_domain_task(DomainTaskParams {
                domain: domain.clone(),
                ctx: Arc::clone(&self.ctx),
                permit,
                cancel: self.cancel.child_token(),
                checkpoint: checkpoint.clone(),
                state: Arc::clone(&state),
            }));
            tasks.push(async move { (domain, handle.await) });
        }
        report.unscheduled.extend(pending);
        if !report.unscheduled.is_empty() {
            warn!(
                "Run cancelled: {} domain(s) were not started",
                report.unscheduled.len()
            );
        }

        while let Some((domain, joined)) = tasks.next().await {
            match joined {
                Ok(result) => report.results.push(result),
                Err(join_error) => {
                    let error = ProbeError::TaskFailed(join_error.to_string());
                    warn!("Task for {domain} panicked: {join_error}");
                    self.ctx.stats.increment_error(error.error_type());
                    let mut result = DomainCheckResult::new(domain);
                    result.mark_broken(&error);
                    state.finish(&result.domain, true);
                    report.results.push(result);
                }
            }
        }

        report.broken = state.broken_snapshot();
        report.elapsed = start.elapsed();
        info!(
            "Batch finished: {} result(s), {} broken, {} skipped in {:.1}s",
            report.results.len(),
            report.broken.len(),
            report.skipped.len(),
            report.elapsed.as_secs_f64()
        );
        report
    }
}
