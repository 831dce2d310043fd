//! Page contexts - everything a template needs to draw one page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field name to validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Link to an author's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorLink {
    pub username: String,
    pub display_name: String,
    pub url: String,
}

/// Link to a category page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryLink {
    pub title: String,
    pub slug: String,
    pub url: String,
}

/// One post as shown in listings and on its own page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCard {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: String,
    pub author: AuthorLink,
    pub category: Option<CategoryLink>,
    /// Only set when the location itself is published.
    pub location: Option<String>,
    pub is_published: bool,
    pub comment_count: u64,
    pub url: String,
}

/// Pager state below a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page: Option<u64>,
    pub previous_page: Option<u64>,
}

/// Front page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexPage {
    pub posts: Vec<PostCard>,
    pub page: PageMeta,
}

/// Posts of one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPage {
    pub category: CategoryLink,
    pub posts: Vec<PostCard>,
    pub page: PageMeta,
}

/// Public profile data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCard {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: String,
}

/// A user's profile with their posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePage {
    pub profile: ProfileCard,
    /// True when the viewer looks at their own profile.
    pub is_owner: bool,
    pub posts: Vec<PostCard>,
    pub page: PageMeta,
}

/// One comment under a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentItem {
    pub id: Uuid,
    pub text: String,
    pub author: AuthorLink,
    pub created_at: String,
    /// Set for the comment's author only.
    pub edit_url: Option<String>,
    pub delete_url: Option<String>,
}

/// A post with its comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailPage {
    pub post: PostCard,
    pub comments: Vec<CommentItem>,
    /// Where the comment form posts to; absent for anonymous viewers.
    pub comment_action: Option<String>,
    pub edit_url: Option<String>,
    pub delete_url: Option<String>,
}

/// A form, either blank, prefilled, or re-shown with errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormPage<F> {
    pub form: F,
    pub errors: FieldErrors,
    pub action: String,
}

/// Delete confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmDeletePage<T> {
    pub object: T,
    pub action: String,
}
