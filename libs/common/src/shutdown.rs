//! Graceful shutdown utilities

use tracing::{info, warn};

/// Wait for Ctrl+C, or SIGTERM on Unix
///
/// ```ignore
/// axum::serve(listener, app)
///     .with_graceful_shutdown(common::shutdown::wait_for_shutdown())
///     .await?;
/// ```
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = match signal(SignalKind::terminate()) {
            Ok(sig) => Some(sig),
            Err(e) => {
                warn!("SIGTERM handler unavailable ({}), only Ctrl+C will stop the service", e);
                None
            },
        };

        let sigterm = async {
            match term.as_mut() {
                Some(sig) => {
                    sig.recv().await;
                },
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Ctrl+C received"),
            _ = sigterm => info!("SIGTERM received"),
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl+C handler failed: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Ctrl+C received");
    }
}
