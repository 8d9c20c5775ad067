//! Askama templates for the blog pages.

use askama::Template;

use crate::flash::Flash;
use crate::models::{Identity, Post};

/// Data every page shares with the base layout.
#[derive(Debug, Default)]
pub struct Page {
    pub current_user: Option<Identity>,
    pub flashes: Vec<Flash>,
}

/// Public listing of every post.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: Page,
    pub posts: Vec<Post>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub page: Page,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: Page,
}

/// The signed-in user's own posts with edit and delete controls.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: Page,
    pub username: String,
    pub posts: Vec<Post>,
}

#[derive(Template)]
#[template(path = "create_post.html")]
pub struct CreatePostTemplate {
    pub page: Page,
}

/// Edit form pre-filled with the stored title and content.
#[derive(Template)]
#[template(path = "edit_post.html")]
pub struct EditPostTemplate {
    pub page: Page,
    pub post: Post,
}
