//! Registration, login and logout pages.

use axum::Form;
use axum::extract::State;
use tower_sessions::Session;

use super::AppState;
use super::utils::{Action, HandlerResult, html, notice, page, recover};
use crate::auth;
use crate::flash::Level;
use crate::models::{Credentials, Registration};
use crate::session;
use crate::templates::{LoginTemplate, RegisterTemplate};

pub async fn register_form(session: Session) -> HandlerResult {
    html(&RegisterTemplate {
        page: page(&session).await?,
    })
}

pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<Registration>,
) -> HandlerResult {
    match auth::register(state.storage.as_ref(), &form).await {
        Ok(_) => {
            notice(
                &session,
                Level::Success,
                "Registration successful! Please log in.",
                "/login",
            )
            .await
        }
        Err(e) => recover(&session, e, Action::Register).await,
    }
}

pub async fn login_form(session: Session) -> HandlerResult {
    html(&LoginTemplate {
        page: page(&session).await?,
    })
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(creds): Form<Credentials>,
) -> HandlerResult {
    match auth::login(state.storage.as_ref(), &creds).await {
        Ok(identity) => {
            session::sign_in(&session, &identity).await?;
            tracing::info!(user_id = identity.user_id, "logged in");
            notice(&session, Level::Success, "Logged in successfully!", "/dashboard").await
        }
        Err(e) => recover(&session, e, Action::Login).await,
    }
}

/// Destroys the session whatever its state, so it is safe to repeat.
pub async fn logout(session: Session) -> HandlerResult {
    session::sign_out(&session).await?;
    notice(&session, Level::Info, "You have been logged out.", "/").await
}
