//! quill: a small multi-user blog served over HTTP, plus a standalone
//! headline scraper.

pub mod auth;
pub mod config;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod headlines;
pub mod migrations;
pub mod models;
pub mod posts;
pub mod server;
pub mod session;
pub mod storage;
pub mod templates;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides `default_filter`.
/// Calling it twice is harmless; the second call logs a warning.
pub fn init_tracing(default_filter: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "tracing init failed");
    }
}
