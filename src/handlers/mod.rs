//! HTTP handlers for the blog.
//!
//! Each handler resolves the session identity, calls the matching operation
//! from [`crate::auth`] or [`crate::posts`], and either renders a page or
//! queues a notice and redirects.

pub mod auth;
pub mod post;
pub mod utils;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::routing::get;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::SessionConfig;
use crate::storage::DynStorage;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: DynStorage,
}

/// Build the session layer backed by an in-process store. Sessions do not
/// survive a restart.
#[must_use]
pub fn session_layer(cfg: &SessionConfig) -> SessionManagerLayer<MemoryStore> {
    let layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(cfg.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_name(cfg.cookie_name.clone())
        .with_http_only(true);
    match cfg.idle_timeout_mins {
        Some(mins) if mins > 0 => {
            layer.with_expiry(Expiry::OnInactivity(time::Duration::minutes(mins)))
        }
        _ => layer,
    }
}

/// Assemble every route with the session, tracing and security header
/// layers.
pub fn router(state: AppState, session: &SessionConfig) -> Router {
    Router::new()
        .route("/", get(post::index))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/dashboard", get(post::dashboard))
        .route("/create", get(post::create_form).post(post::create))
        .route("/edit/:id", get(post::edit_form).post(post::edit))
        .route("/delete/:id", axum::routing::post(post::delete))
        .layer(session_layer(session))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
