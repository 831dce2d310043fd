//! Application services - the read and write flows behind every page.
//!
//! `Blog` owns the repositories and applies the visibility and ownership
//! rules so that no handler has to re-implement them.

mod accounts;
mod comments;
mod listing;
mod posts;

use std::sync::Arc;

use crate::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};

pub use listing::{CategoryListing, PostDetail, ProfileListing};

/// The set of stores the blog reads from and writes to.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

/// Blog service.
#[derive(Clone)]
pub struct Blog {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    locations: Arc<dyn LocationRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl Blog {
    pub fn new(repos: Repositories) -> Self {
        Self {
            users: repos.users,
            categories: repos.categories,
            locations: repos.locations,
            posts: repos.posts,
            comments: repos.comments,
        }
    }
}
