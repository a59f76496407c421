use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Install a shutdown handler that listens for SIGTERM and ctrl-c.
///
/// Returns a `CancellationToken` that is cancelled when either signal
/// arrives. The orchestrator stops admitting queued tasks and lets running
/// scans drain.
pub fn install_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, draining running scans");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received ctrl-c, draining running scans");
            }
        }

        token_clone.cancel();
    });

    token
}
