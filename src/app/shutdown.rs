//! Graceful shutdown handling.

use log::warn;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Stops the periodic logging task and waits for it.
pub async fn shutdown_gracefully(cancel: CancellationToken, logging_task: Option<JoinHandle<()>>) {
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        let _ = logging_task.await;
    }
}

/// Cancels `run_cancel` on Ctrl-C.
///
/// In-flight probes observe the token and finish as broken ("probe cancelled");
/// no new domain is started. The listener exits once the token is cancelled
/// for any reason.
pub fn spawn_ctrl_c_listener(run_cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    warn!("Interrupt received: cancelling in-flight domains, no new domains will start");
                    run_cancel.cancel();
                }
                Err(e) => warn!("Failed to listen for Ctrl-C: {e}"),
            },
            _ = run_cancel.cancelled() => {}
        }
    })
}
