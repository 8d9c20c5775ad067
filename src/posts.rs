//! Post operations with authentication and ownership enforced.
//!
//! Every mutating operation checks, in order: that a viewer is present, that
//! the post exists, and that the viewer owns it. The final write repeats the
//! ownership condition in the same statement, so a post that changed hands or
//! vanished after the check is never touched.

use chrono::Utc;

use crate::error::BlogError;
use crate::models::{Identity, Post, PostDraft, PostId};
use crate::storage::Storage;

/// # Errors
///
/// [`BlogError::NotAuthenticated`] when there is no viewer.
pub fn require(viewer: Option<&Identity>) -> Result<&Identity, BlogError> {
    viewer.ok_or(BlogError::NotAuthenticated)
}

/// Every post, newest first. Needs no session.
///
/// # Errors
///
/// Propagates storage failures.
pub async fn list_posts(storage: &dyn Storage) -> Result<Vec<Post>, BlogError> {
    Ok(storage.list_posts().await?)
}

/// The viewer's own posts, newest first.
///
/// # Errors
///
/// [`BlogError::NotAuthenticated`] without a viewer.
pub async fn dashboard(
    storage: &dyn Storage,
    viewer: Option<&Identity>,
) -> Result<Vec<Post>, BlogError> {
    let viewer = require(viewer)?;
    Ok(storage.list_posts_by_owner(viewer.user_id).await?)
}

/// # Errors
///
/// [`BlogError::NotAuthenticated`] without a viewer,
/// [`BlogError::Validation`] for a blank or oversized title.
pub async fn create_post(
    storage: &dyn Storage,
    viewer: Option<&Identity>,
    draft: &PostDraft,
) -> Result<Post, BlogError> {
    let viewer = require(viewer)?;
    draft.validate()?;
    let id = storage.add_post(viewer.user_id, draft, Utc::now()).await?;
    tracing::info!(user_id = viewer.user_id, post_id = id, "created post");
    storage
        .get_post(id)
        .await?
        .ok_or(BlogError::NotFound(id))
}

/// Load a post for its edit form, applying the same checks as an edit.
///
/// # Errors
///
/// [`BlogError::NotAuthenticated`], [`BlogError::NotFound`] or
/// [`BlogError::NotAuthorized`].
pub async fn post_for_edit(
    storage: &dyn Storage,
    viewer: Option<&Identity>,
    id: PostId,
) -> Result<Post, BlogError> {
    let viewer = require(viewer)?;
    owned_post(storage, viewer, id).await
}

/// Overwrite title and content. The creation time is left alone.
///
/// # Errors
///
/// [`BlogError::NotAuthenticated`], [`BlogError::NotFound`],
/// [`BlogError::NotAuthorized`] or [`BlogError::Validation`].
pub async fn edit_post(
    storage: &dyn Storage,
    viewer: Option<&Identity>,
    id: PostId,
    draft: &PostDraft,
) -> Result<Post, BlogError> {
    let viewer = require(viewer)?;
    let mut post = owned_post(storage, viewer, id).await?;
    draft.validate()?;
    if !storage.update_post(id, viewer.user_id, draft).await? {
        return Err(BlogError::NotFound(id));
    }
    tracing::info!(user_id = viewer.user_id, post_id = id, "updated post");
    post.title.clone_from(&draft.title);
    post.content.clone_from(&draft.content);
    Ok(post)
}

/// Permanently remove a post.
///
/// # Errors
///
/// [`BlogError::NotAuthenticated`], [`BlogError::NotFound`] or
/// [`BlogError::NotAuthorized`].
pub async fn delete_post(
    storage: &dyn Storage,
    viewer: Option<&Identity>,
    id: PostId,
) -> Result<(), BlogError> {
    let viewer = require(viewer)?;
    owned_post(storage, viewer, id).await?;
    if !storage.delete_post(id, viewer.user_id).await? {
        return Err(BlogError::NotFound(id));
    }
    tracing::info!(user_id = viewer.user_id, post_id = id, "deleted post");
    Ok(())
}

async fn owned_post(
    storage: &dyn Storage,
    viewer: &Identity,
    id: PostId,
) -> Result<Post, BlogError> {
    let post = storage.get_post(id).await?.ok_or(BlogError::NotFound(id))?;
    if post.user_id != viewer.user_id {
        tracing::warn!(user_id = viewer.user_id, post_id = id, "ownership check failed");
        return Err(BlogError::NotAuthorized {
            user: viewer.user_id,
            post: id,
        });
    }
    Ok(post)
}
