use super::{
    Storage,
    common::{PostRow, UserRow, collect_posts, to_millis},
    migrations::postgres::PostgresStorageMigrator,
};
use crate::error::StorageError;
use crate::migrations::Migrator;
use crate::models::{NewUser, Post, PostDraft, PostId, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::str::FromStr;

pub(crate) const USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )";

pub(crate) const POSTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS posts (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at BIGINT NOT NULL,
        user_id BIGINT NOT NULL REFERENCES users(id)
    )";

const POSTS_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS posts_owner_created ON posts (user_id, created_at)";

const SELECT_POSTS: &str = "SELECT p.id, p.title, p.content, p.created_at, p.user_id, \
     u.username AS author FROM posts p JOIN users u ON u.id = p.user_id";

#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Connect to PostgreSQL and bring the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is invalid, the connection fails, or the
    /// schema cannot be created or migrated.
    #[tracing::instrument(skip_all)]
    pub async fn new(uri: &str) -> anyhow::Result<Self> {
        let opts = PgConnectOptions::from_str(uri)?;
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        sqlx::query(USERS_TABLE).execute(&pool).await?;
        sqlx::query(POSTS_TABLE).execute(&pool).await?;
        sqlx::query(POSTS_OWNER_INDEX).execute(&pool).await?;
        PostgresStorageMigrator::new(pool.clone()).prepare().await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    #[tracing::instrument(skip_all)]
    async fn add_user(&self, user: &NewUser) -> Result<UserId, StorageError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    #[tracing::instrument(skip_all)]
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, email, password_hash FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    #[tracing::instrument(skip_all)]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash FROM users WHERE username = $1",
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
             WHERE username = $1 OR email = $2 LIMIT 1",
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
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO posts (title, content, created_at, user_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(to_millis(created_at))
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    #[tracing::instrument(skip_all)]
    async fn get_post(&self, id: PostId) -> Result<Option<Post>, StorageError> {
        let row: Option<PostRow> = sqlx::query_as(&format!("{SELECT_POSTS} WHERE p.id = $1"))
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
            "{SELECT_POSTS} WHERE p.user_id = $1 ORDER BY p.created_at DESC, p.id DESC"
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
        let done =
            sqlx::query("UPDATE posts SET title = $1, content = $2 WHERE id = $3 AND user_id = $4")
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
        let done = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() == 1)
    }
}
