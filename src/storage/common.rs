use crate::error::StorageError;
use crate::models::{Post, User};
use chrono::{DateTime, TimeZone, Utc};

/// Raw `users` row as read by both backends.
#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
        }
    }
}

/// Raw `posts` row joined with the owner's username.
#[derive(sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub user_id: i64,
    pub author: String,
}

impl TryFrom<PostRow> for Post {
    type Error = StorageError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created_at: from_millis(row.created_at)?,
            user_id: row.user_id,
            author: row.author,
        })
    }
}

/// Timestamps are stored as milliseconds since the Unix epoch.
#[must_use]
pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// # Errors
///
/// Returns an error when the stored value is outside chrono's range.
pub fn from_millis(ms: i64) -> Result<DateTime<Utc>, StorageError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| StorageError::Database(format!("invalid timestamp {ms}").into()))
}

/// Convert a batch of rows, failing on the first bad timestamp.
///
/// # Errors
///
/// Propagates the first conversion error.
pub fn collect_posts(rows: Vec<PostRow>) -> Result<Vec<Post>, StorageError> {
    rows.into_iter().map(Post::try_from).collect()
}
