//! Read models - entities joined with what a page needs to show them.

use serde::Serialize;
use uuid::Uuid;

use super::{Category, Comment, Location, Post, User};

/// Public face of a user, attached to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name(),
        }
    }
}

/// A post together with its related rows and the derived comment count.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: Post,
    pub author: Author,
    pub category: Option<Category>,
    pub location: Option<Location>,
    /// Derived at read time, never persisted.
    pub comment_count: u64,
}

/// A comment with its author resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author: Author,
}
