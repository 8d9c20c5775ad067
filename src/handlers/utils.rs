//! Shared plumbing for the page handlers: page context, template rendering,
//! and mapping operation errors to a notice plus redirect.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::error::BlogError;
use crate::flash::{self, Level};
use crate::models::{Identity, PostId};
use crate::session;
use crate::templates::Page;

/// An infrastructure failure. Logged with its full chain and answered with a
/// bare 500 so no internal detail reaches the client.
#[derive(Debug)]
pub struct HandlerError(anyhow::Error);

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

impl<E> From<E> for HandlerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type HandlerResult = Result<Response, HandlerError>;

/// Render a template into an HTML response.
pub fn html<T: Template>(template: &T) -> HandlerResult {
    Ok(Html(template.render()?).into_response())
}

/// Build the shared page context, consuming any pending notices.
pub async fn page(session: &Session) -> Result<Page, HandlerError> {
    Ok(Page {
        current_user: session::current(session).await?,
        flashes: flash::take(session).await?,
    })
}

/// Queue a notice and redirect with `303 See Other`.
pub async fn notice(session: &Session, level: Level, message: &str, to: &str) -> HandlerResult {
    flash::push(session, level, message).await?;
    Ok(Redirect::to(to).into_response())
}

/// Pages that can fail with a recoverable error. Each one words the
/// notices for its own failures.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    Register,
    Login,
    Dashboard,
    Create,
    Edit(PostId),
    Delete(PostId),
}

impl Action {
    fn login_prompt(self) -> &'static str {
        match self {
            Action::Dashboard => "Please log in to access the dashboard.",
            Action::Create => "Please log in to create a post.",
            _ => "Please log in first.",
        }
    }

    fn denied(self) -> &'static str {
        match self {
            Action::Delete(_) => "You are not allowed to delete this post.",
            _ => "You are not allowed to edit this post.",
        }
    }

    fn form(self) -> String {
        match self {
            Action::Register => "/register".into(),
            Action::Login => "/login".into(),
            Action::Create => "/create".into(),
            Action::Edit(id) => format!("/edit/{id}"),
            Action::Dashboard | Action::Delete(_) => "/dashboard".into(),
        }
    }
}

/// Turn an operation error into a notice and redirect. Storage and hashing
/// failures are not recoverable and become a 500.
pub async fn recover(session: &Session, err: BlogError, action: Action) -> HandlerResult {
    match err {
        BlogError::DuplicateCredential => {
            notice(session, Level::Danger, "Username or email already exists", "/register").await
        }
        BlogError::InvalidCredentials(username) => {
            tracing::info!(%username, "failed login");
            notice(session, Level::Danger, "Invalid username or password", "/login").await
        }
        BlogError::NotAuthenticated => {
            notice(session, Level::Warning, action.login_prompt(), "/login").await
        }
        BlogError::NotAuthorized { .. } => {
            notice(session, Level::Danger, action.denied(), "/dashboard").await
        }
        BlogError::NotFound(_) => {
            notice(session, Level::Warning, "Post not found.", "/dashboard").await
        }
        BlogError::Validation(e) => {
            let message = capitalize(&e.to_string());
            notice(session, Level::Danger, &message, &action.form()).await
        }
        BlogError::Storage(e) => Err(e.into()),
        BlogError::PasswordHash(e) => Err(anyhow::anyhow!("password hashing failed: {e}").into()),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>() + ".",
        None => String::new(),
    }
}

/// The identity bound to the request's session, if any.
pub async fn viewer(session: &Session) -> Result<Option<Identity>, HandlerError> {
    Ok(session::current(session).await?)
}
