use crate::error::StorageError;
use crate::models::{NewUser, Post, PostDraft, PostId, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a user and return the assigned id. A taken username or email
    /// surfaces as [`StorageError::Conflict`].
    async fn add_user(&self, user: &NewUser) -> Result<UserId, StorageError>;

    /// Retrieve a user by id
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// Retrieve a user by exact username
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Retrieve any user whose username equals `username` or whose email
    /// equals `email`
    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StorageError>;

    /// Insert a post owned by `owner`. A missing owner surfaces as
    /// [`StorageError::Integrity`].
    async fn add_post(
        &self,
        owner: UserId,
        draft: &PostDraft,
        created_at: DateTime<Utc>,
    ) -> Result<PostId, StorageError>;

    /// Retrieve a post by id
    async fn get_post(&self, id: PostId) -> Result<Option<Post>, StorageError>;

    /// All posts, newest first
    async fn list_posts(&self) -> Result<Vec<Post>, StorageError>;

    /// Posts owned by `owner`, newest first
    async fn list_posts_by_owner(&self, owner: UserId) -> Result<Vec<Post>, StorageError>;

    /// Overwrite title and content of post `id` if and only if it is owned by
    /// `owner`. Returns whether a row was changed.
    async fn update_post(
        &self,
        id: PostId,
        owner: UserId,
        draft: &PostDraft,
    ) -> Result<bool, StorageError>;

    /// Delete post `id` if and only if it is owned by `owner`. Returns whether
    /// a row was removed.
    async fn delete_post(&self, id: PostId, owner: UserId) -> Result<bool, StorageError>;
}

pub type DynStorage = Arc<dyn Storage>;

pub mod common;
pub mod migrations;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;

/// Create a storage backend from a connection URI.
///
/// # Errors
///
/// Returns an error for an unknown scheme, a disabled backend, or when the
/// backend cannot be opened.
pub async fn open(uri: &str) -> anyhow::Result<DynStorage> {
    if uri.starts_with("sqlite:") {
        Ok(Arc::new(sqlite::SqliteStorage::new(uri).await?))
    } else if uri.starts_with("postgres:") {
        #[cfg(feature = "postgres")]
        {
            Ok(Arc::new(postgres::PostgresStorage::new(uri).await?))
        }
        #[cfg(not(feature = "postgres"))]
        {
            anyhow::bail!("postgres backend not enabled")
        }
    } else {
        anyhow::bail!("unknown storage backend: {uri}")
    }
}
