//! Graceful Shutdown
//!
//! Serves the router until SIGINT or SIGTERM, then stops accepting
//! connections and gives in-flight requests up to the configured timeout to
//! finish. Requests still running after that are dropped; log writes already
//! handed to the store complete on their own task.

use std::future::{Future, IntoFuture};
use std::time::Duration;

/// Configuration for graceful shutdown behavior
#[derive(Debug, Clone)]
pub struct GracefulShutdown {
    /// Maximum time to wait for in-flight requests to complete
    pub timeout: Duration,
}

impl GracefulShutdown {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Shutdown signal type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Received SIGINT (Ctrl+C)
    SigInt,
    /// Received SIGTERM
    SigTerm,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SigInt => write!(f, "SIGINT (Ctrl+C)"),
            Self::SigTerm => write!(f, "SIGTERM"),
        }
    }
}

/// Create a future that completes when a shutdown signal is received
pub async fn shutdown_signal() -> ShutdownSignal {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => ShutdownSignal::SigInt,
            Err(e) => {
                tracing::error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<ShutdownSignal>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                ShutdownSignal::SigTerm
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<ShutdownSignal>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<ShutdownSignal>();

    tokio::select! {
        signal = ctrl_c => signal,
        signal = terminate => signal,
    }
}

/// Start the API server and shut down gracefully on SIGINT/SIGTERM.
pub async fn serve_with_shutdown(
    router: axum::Router,
    port: u16,
    config: GracefulShutdown,
) -> Result<(), Box<dyn std::error::Error>> {
    serve_until(router, port, config, async {
        let signal = shutdown_signal().await;
        tracing::info!(%signal, "initiating graceful shutdown");
    })
    .await
}

/// Start the API server and shut down gracefully when `signal` completes.
pub async fn serve_until<F>(
    router: axum::Router,
    port: u16,
    config: GracefulShutdown,
    signal: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("REST API server listening on {}", addr);
    tracing::info!("   Swagger UI: http://localhost:{}/swagger-ui", port);
    tracing::info!("   Health: http://localhost:{}/health", port);
    tracing::info!("   Graceful shutdown timeout: {:?}", config.timeout);

    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel::<()>();
    let graceful = async move {
        signal.await;
        let _ = drain_tx.send(());
    };

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(graceful)
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = async {
            // Only starts counting once the signal has fired
            if drain_rx.await.is_ok() {
                tokio::time::sleep(config.timeout).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            tracing::warn!(
                timeout_ms = config.timeout.as_millis() as u64,
                "in-flight requests did not finish in time, forcing shutdown"
            );
            return Ok(());
        }
    }

    tracing::info!("Server shut down gracefully");
    Ok(())
}
