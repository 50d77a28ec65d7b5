//! Per-domain task processing.
//!
//! This module contains the body of the task spawned for each domain: probe
//! under the run's cancellation token, checkpoint, count and report progress.

use std::sync::Arc;

use tokio::sync::OwnedSemaphorePermit;
use tokio_util::sync::CancellationToken;

use crate::error_handling::{ErrorType, ProbeError};
use crate::probe::{probe_domain, DomainCheckResult, ProbeContext};
use crate::storage::CheckpointStore;

use super::resources::RunState;

/// Everything a domain task owns.
pub(crate) struct DomainTaskParams {
    pub domain: String,
    pub ctx: Arc<ProbeContext>,
    pub permit: OwnedSemaphorePermit,
    pub cancel: CancellationToken,
    pub checkpoint: Option<Arc<CheckpointStore>>,
    pub state: Arc<RunState>,
}

/// Process a single domain.
///
/// The semaphore permit is held until the checkpoint entry is written.
pub(crate) async fn process_domain_task(params: DomainTaskParams) -> DomainCheckResult {
    let DomainTaskParams {
        domain,
        ctx,
        permit: _permit,
        cancel,
        checkpoint,
        state,
    } = params;

    let outcome = probe_domain(&domain, &ctx, &cancel).await;
    let cancelled = matches!(outcome.error(), Some(ProbeError::Cancelled));
    let result = outcome.into_result();

    // Cancelled domains stay out of the checkpoint so a resumed run retries them
    if let (Some(store), false) = (checkpoint.as_ref(), cancelled) {
        if let Err(e) = store.append(&result.domain).await {
            log::warn!(
                "Failed to append {} to checkpoint {}: {e}",
                result.domain,
                store.path().display()
            );
            ctx.stats.increment_error(ErrorType::CheckpointWriteError);
        }
    }

    state.finish(&result.domain, result.is_broken);
    result
}
