//! Domain error types for the blog server and the headline scraper.
//!
//! Errors are structured internally for logging/debugging but handlers only
//! ever show clients a generic notice (see `handlers::utils::recover`).

use crate::models::{PostId, UserId};
use thiserror::Error;

/// Failures of the blog operations (registration, login and post access).
#[derive(Error, Debug)]
pub enum BlogError {
    #[error("username or email already registered")]
    DuplicateCredential,

    #[error("invalid credentials for user: {0}")]
    InvalidCredentials(String),

    #[error("user {user} does not own post {post}")]
    NotAuthorized { user: UserId, post: PostId },

    #[error("post not found: {0}")]
    NotFound(PostId),

    #[error("authentication required")]
    NotAuthenticated,

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("referential integrity violated: {0}")]
    Integrity(String),

    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StorageError::Conflict(db.message().to_string());
            }
            if db.is_foreign_key_violation() {
                return StorageError::Integrity(db.message().to_string());
            }
        }
        StorageError::Database(Box::new(err))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot expand placeholder {0}")]
    Placeholder(String),

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status code {0}")]
    Status(u16),

    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
