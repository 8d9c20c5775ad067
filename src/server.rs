use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{Config, listen_addr};
use crate::handlers::{self, AppState};
use crate::storage;

/// Resolve when the process is asked to stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutting down");
}

/// Open the store, bind the listener and serve until a shutdown signal.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the address cannot be
/// bound, or the server fails.
pub async fn run(cfg: Config) -> Result<()> {
    let storage = storage::open(&cfg.db_path)
        .await
        .with_context(|| format!("opening database {}", cfg.db_path))?;
    let app = handlers::router(AppState { storage }, &cfg.session);

    let addr = listen_addr(&cfg.addr);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {}", listener.local_addr()?);
    if !cfg.session.secure_cookies {
        tracing::warn!("secure cookies disabled; enable session.secure_cookies behind HTTPS");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
