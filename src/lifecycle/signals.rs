//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate the first one received into a shutdown reason
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A handler that cannot be installed never fires; it must not be mistaken
//!   for a received signal

use crate::lifecycle::shutdown::ShutdownReason;

/// Wait for SIGINT or SIGTERM (ctrl-c on non-unix targets).
pub async fn terminate() -> ShutdownReason {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let sigterm = async {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = interrupt() => ShutdownReason::Signal("SIGINT"),
            _ = sigterm => ShutdownReason::Signal("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        interrupt().await;
        ShutdownReason::Signal("ctrl-c")
    }
}

async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
