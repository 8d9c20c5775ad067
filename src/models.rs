//! Rows and form payloads shared by the store, the operations and the
//! handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub type UserId = i64;
pub type PostId = i64;

pub const MAX_USERNAME_CHARS: usize = 150;
pub const MAX_EMAIL_CHARS: usize = 150;
pub const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A user row about to be inserted. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
    /// Username of the owner, joined in on read.
    pub author: String,
}

impl Post {
    /// Creation time as shown on rendered pages.
    #[must_use]
    pub fn created_label(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// The authenticated user bound to a browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Title and content submitted for a new or edited post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl Registration {
    /// Reject blank fields and values longer than the stored columns.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("username", &self.username, Some(MAX_USERNAME_CHARS))?;
        require("email", &self.email, Some(MAX_EMAIL_CHARS))?;
        require("password", &self.password, None)
    }
}

impl PostDraft {
    /// # Errors
    ///
    /// Returns an error when the title is blank or too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title, Some(MAX_TITLE_CHARS))
    }
}

fn require(field: &'static str, value: &str, max: Option<usize>) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    match max {
        Some(max) if value.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        _ => Ok(()),
    }
}
