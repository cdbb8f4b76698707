//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl-C) or SIGTERM
//! - Drain remote sinks through the exit handlers before the process ends
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers run on a blocking thread; they wait on sink workers

use crate::lifecycle::exit;

/// Resolves when the process is asked to stop.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

/// Wait for a shutdown signal, run the exit handlers, and exit with status 0.
///
/// Never returns once a signal arrives.
pub async fn drain_on_signal() {
    shutdown_signal().await;
    let _ = tokio::task::spawn_blocking(exit::run_handlers).await;
    std::process::exit(0)
}
