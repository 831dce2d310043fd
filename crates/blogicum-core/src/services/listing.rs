use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::Blog;
use crate::domain::{Category, CommentView, PostView, User};
use crate::error::DomainError;
use crate::pagination::{PAGE_SIZE, Page, PageRequest, PageWindow};
use crate::policy::{PostFilter, Viewer};

/// Posts of one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub category: Category,
    pub page: Page<PostView>,
}

/// Posts of one author.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileListing {
    pub profile: User,
    pub page: Page<PostView>,
}

/// A post with its comments.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

impl Blog {
    /// Count, clamp the requested page, then load that slice.
    async fn paginate(
        &self,
        filter: PostFilter,
        request: PageRequest,
    ) -> Result<Page<PostView>, DomainError> {
        let total = self.posts.count(&filter).await?;
        let window = PageWindow::resolve(request, total, PAGE_SIZE);
        let items = self
            .posts
            .list(&filter, window.offset(), window.limit())
            .await?;
        Ok(Page::new(items, window, total))
    }

    /// Front page: every publicly visible post.
    pub async fn index(&self, request: PageRequest) -> Result<Page<PostView>, DomainError> {
        self.paginate(PostFilter::published(Utc::now()), request)
            .await
    }

    /// Publicly visible posts of a published category.
    ///
    /// An unpublished category is not found, whatever it contains.
    pub async fn category_posts(
        &self,
        slug: &str,
        request: PageRequest,
    ) -> Result<CategoryListing, DomainError> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        let filter = PostFilter::published(Utc::now()).in_category(category.id);
        let page = self.paginate(filter, request).await?;
        Ok(CategoryListing { category, page })
    }

    /// A user's posts; the owner also sees unpublished and future ones.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Viewer,
        request: PageRequest,
    ) -> Result<ProfileListing, DomainError> {
        let profile = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let filter = PostFilter::profile(profile.id, viewer, Utc::now());
        let page = self.paginate(filter, request).await?;
        Ok(ProfileListing { profile, page })
    }

    /// A single post, if `viewer` may see it, with its comments.
    pub async fn post_detail(&self, id: Uuid, viewer: Viewer) -> Result<PostDetail, DomainError> {
        let post = self
            .posts
            .find_view(id)
            .await?
            .filter(|view| view.is_visible_to(viewer, Utc::now()))
            .ok_or_else(|| DomainError::not_found("post", id))?;

        let comments = self.comments.list_for_post(id).await?;
        Ok(PostDetail { post, comments })
    }
}
