//! HTTP intake server
//!
//! Serves [`handler::intake_router`] until the shutdown signal fires, drains
//! open connections for at most `server.shutdown_timeout_secs`, then releases
//! the anonymization engine.

pub mod error;
pub mod handler;

pub use error::{ApiError, ApiErrorDetail, ApiFailure};
pub use handler::{intake_router, IntakeState};

use crate::config::ServerConfig;
use crate::core::intake::FeedbackService;
use crate::domain::{RedactorError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Run the intake server
///
/// `shutdown` flips to `true` when the process should stop accepting requests.
pub async fn serve(
    config: &ServerConfig,
    service: FeedbackService,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let addr = config.socket_addr().map_err(RedactorError::Configuration)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RedactorError::Io(format!("Failed to bind to {addr}: {e}")))?;

    let service = Arc::new(service);
    let app = intake_router(IntakeState {
        service: Arc::clone(&service),
    });

    tracing::info!(address = %addr, "Feedback intake listening");

    let mut graceful_rx = shutdown.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = graceful_rx.wait_for(|stop| *stop).await;
        tracing::info!("Shutdown signal received, draining connections");
    });

    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    let mut deadline_rx = shutdown;
    let deadline = async move {
        let _ = deadline_rx.wait_for(|stop| *stop).await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| RedactorError::Io(format!("Server error: {e}")))?;
        }
        _ = deadline => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "Shutdown timeout elapsed, closing remaining connections"
            );
        }
    }

    match Arc::try_unwrap(service) {
        Ok(service) => service.shutdown(),
        Err(_) => tracing::warn!("Requests still in flight at shutdown; engine not released"),
    }

    tracing::info!("Feedback intake stopped");
    Ok(())
}
