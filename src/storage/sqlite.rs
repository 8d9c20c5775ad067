use super::{
    Storage,
    common::{PostRow, UserRow, collect_posts, to_millis},
    migrations::sqlite::SqliteStorageMigrator,
};
use crate::error::StorageError;
use crate::migrations::Migrator;
use crate::models::{NewUser, Post, PostDraft, PostId, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;

pub(crate) const USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )";

pub(crate) const POSTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users(id)
    )";

const POSTS_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS posts_owner_created ON posts (user_id, created_at)";

const SELECT_POSTS: &str = "SELECT p.id, p.title, p.content, p.created_at, p.user_id, \
     u.username AS author FROM posts p JOIN users u ON u.id = p.user_id";

#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (creating if missing) a SQLite database and bring its schema up
    /// to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is invalid, the connection fails, or the
    /// schema cannot be created or migrated.
    #[tracing::instrument(skip_all)]
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| {
                anyhow::anyhow!(
                    "invalid SQLite database URI '{path}': {e}\n\
                     expected sqlite:///abs/path.db, sqlite://relative.db or sqlite::memory:"
                )
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| anyhow::anyhow!("failed to open SQLite database '{path}': {e}"))?;

        sqlx::query(USERS_TABLE).execute(&pool).await?;
        sqlx::query(POSTS_TABLE).execute(&pool).await?;
        sqlx::query(POSTS_OWNER_INDEX).execute(&pool).await?;
        SqliteStorageMigrator::new(pool.clone()).prepare().await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    #[tracing::instrument(skip_all)]
    async fn add_user(&self, user: &NewUser) -> Result<UserId, StorageError> {
        let done = sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)")
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await?;
        Ok(done.last_insert_rowid())
    }

    #[tracing::instrument(skip_all)]
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, email, password_hash FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    #[tracing::instrument(skip_all)]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    #[tracing::instrument(skip_all)]
    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StorageError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash FROM users \
             WHERE username = ? OR email = ? LIMIT 1",
        )
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    #[tracing::instrument(skip_all)]
    async fn add_post(
        &self,
        owner: UserId,
        draft: &PostDraft,
        created_at: DateTime<Utc>,
    ) -> Result<PostId, StorageError> {
        let done = sqlx::query(
            "INSERT INTO posts (title, content, created_at, user_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(to_millis(created_at))
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(done.last_insert_rowid())
    }

    #[tracing::instrument(skip_all)]
    async fn get_post(&self, id: PostId) -> Result<Option<Post>, StorageError> {
        let row: Option<PostRow> = sqlx::query_as(&format!("{SELECT_POSTS} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Post::try_from).transpose()
    }

    #[tracing::instrument(skip_all)]
    async fn list_posts(&self) -> Result<Vec<Post>, StorageError> {
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "{SELECT_POSTS} ORDER BY p.created_at DESC, p.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        collect_posts(rows)
    }

    #[tracing::instrument(skip_all)]
    async fn list_posts_by_owner(&self, owner: UserId) -> Result<Vec<Post>, StorageError> {
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "{SELECT_POSTS} WHERE p.user_id = ? ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        collect_posts(rows)
    }

    #[tracing::instrument(skip_all)]
    async fn update_post(
        &self,
        id: PostId,
        owner: UserId,
        draft: &PostDraft,
    ) -> Result<bool, StorageError> {
        let done = sqlx::query("UPDATE posts SET title = ?, content = ? WHERE id = ? AND user_id = ?")
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() == 1)
    }

    #[tracing::instrument(skip_all)]
    async fn delete_post(&self, id: PostId, owner: UserId) -> Result<bool, StorageError> {
        let done = sqlx::query("DELETE FROM posts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() == 1)
    }
}
