//! Binding between a browser session and an authenticated user.
//!
//! The session itself (cookie token, server-side record) is managed by
//! `tower-sessions`; this module only decides what is stored in it.

use tower_sessions::Session;
use tower_sessions::session::Error;

use crate::models::Identity;

const IDENTITY_KEY: &str = "identity";

/// The identity bound to this session, if any.
///
/// # Errors
///
/// Returns an error if the session store fails or the record is corrupt.
pub async fn current(session: &Session) -> Result<Option<Identity>, Error> {
    session.get(IDENTITY_KEY).await
}

/// Bind the session to `identity`, rotating the session id first so a token
/// issued before login cannot be reused afterwards.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn sign_in(session: &Session, identity: &Identity) -> Result<(), Error> {
    session.cycle_id().await?;
    session.insert(IDENTITY_KEY, identity).await
}

/// Destroy the session: its record is removed from the store and a new id
/// is issued, so anything written afterwards lands in a fresh session. Safe
/// to call on an empty session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn sign_out(session: &Session) -> Result<(), Error> {
    session.flush().await?;
    session.cycle_id().await
}
