//! Post listing, dashboard and the create, edit and delete pages.

use axum::Form;
use axum::extract::{Path, State};
use tower_sessions::Session;

use super::AppState;
use super::utils::{Action, HandlerResult, html, notice, page, recover, viewer};
use crate::flash::Level;
use crate::models::{PostDraft, PostId};
use crate::posts;
use crate::templates::{CreatePostTemplate, DashboardTemplate, EditPostTemplate, IndexTemplate};

pub async fn index(State(state): State<AppState>, session: Session) -> HandlerResult {
    let posts = posts::list_posts(state.storage.as_ref()).await?;
    html(&IndexTemplate {
        page: page(&session).await?,
        posts,
    })
}

pub async fn dashboard(State(state): State<AppState>, session: Session) -> HandlerResult {
    let viewer = viewer(&session).await?;
    let posts = match posts::dashboard(state.storage.as_ref(), viewer.as_ref()).await {
        Ok(posts) => posts,
        Err(e) => return recover(&session, e, Action::Dashboard).await,
    };
    let username = viewer.map(|v| v.username).unwrap_or_default();
    html(&DashboardTemplate {
        page: page(&session).await?,
        username,
        posts,
    })
}

pub async fn create_form(session: Session) -> HandlerResult {
    let viewer = viewer(&session).await?;
    if let Err(e) = posts::require(viewer.as_ref()) {
        return recover(&session, e, Action::Create).await;
    }
    html(&CreatePostTemplate {
        page: page(&session).await?,
    })
}

pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(draft): Form<PostDraft>,
) -> HandlerResult {
    let viewer = viewer(&session).await?;
    match posts::create_post(state.storage.as_ref(), viewer.as_ref(), &draft).await {
        Ok(_) => notice(&session, Level::Success, "Post created successfully!", "/dashboard").await,
        Err(e) => recover(&session, e, Action::Create).await,
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<PostId>,
) -> HandlerResult {
    let viewer = viewer(&session).await?;
    match posts::post_for_edit(state.storage.as_ref(), viewer.as_ref(), id).await {
        Ok(post) => html(&EditPostTemplate {
            page: page(&session).await?,
            post,
        }),
        Err(e) => recover(&session, e, Action::Edit(id)).await,
    }
}

pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<PostId>,
    Form(draft): Form<PostDraft>,
) -> HandlerResult {
    let viewer = viewer(&session).await?;
    match posts::edit_post(state.storage.as_ref(), viewer.as_ref(), id, &draft).await {
        Ok(_) => notice(&session, Level::Success, "Post updated successfully!", "/dashboard").await,
        Err(e) => recover(&session, e, Action::Edit(id)).await,
    }
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<PostId>,
) -> HandlerResult {
    let viewer = viewer(&session).await?;
    match posts::delete_post(state.storage.as_ref(), viewer.as_ref(), id).await {
        Ok(()) => notice(&session, Level::Info, "Post deleted successfully!", "/dashboard").await,
        Err(e) => recover(&session, e, Action::Delete(id)).await,
    }
}
