use uuid::Uuid;

use super::Blog;
use crate::domain::Post;
use crate::error::DomainError;
use crate::forms::{CleanPost, FormErrors, INVALID_CHOICE, PostForm};
use crate::policy::ensure_author;
use crate::ports::BaseRepository;

impl Blog {
    /// Validate the form, including that the chosen category and location
    /// exist.
    async fn clean_post(&self, form: &PostForm) -> Result<CleanPost, DomainError> {
        let clean = form.clean().map_err(DomainError::Validation)?;

        let mut errors = FormErrors::new();
        if let Some(id) = clean.category_id {
            if self.categories.find_by_id(id).await?.is_none() {
                errors.add("category", INVALID_CHOICE);
            }
        }
        if let Some(id) = clean.location_id {
            if self.locations.find_by_id(id).await?.is_none() {
                errors.add("location", INVALID_CHOICE);
            }
        }
        errors.finish(clean).map_err(DomainError::Validation)
    }

    /// Load a post its author is about to change.
    pub async fn post_for_edit(&self, id: Uuid, user_id: Uuid) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))?;
        ensure_author(&post, user_id)?;
        Ok(post)
    }

    /// Create a post authored by `author_id`.
    pub async fn create_post(&self, author_id: Uuid, form: &PostForm) -> Result<Post, DomainError> {
        let clean = self.clean_post(form).await?;
        let post = Post::new(author_id, clean.title, clean.text, clean.pub_date)
            .with_category(clean.category_id)
            .with_location(clean.location_id);
        Ok(self.posts.save(post).await?)
    }

    /// Apply an edit form. Author, publication flag and creation time stay
    /// as they are.
    pub async fn update_post(
        &self,
        id: Uuid,
        user_id: Uuid,
        form: &PostForm,
    ) -> Result<Post, DomainError> {
        let mut post = self.post_for_edit(id, user_id).await?;
        let clean = self.clean_post(form).await?;

        post.title = clean.title;
        post.text = clean.text;
        post.pub_date = clean.pub_date;
        post.category_id = clean.category_id;
        post.location_id = clean.location_id;

        Ok(self.posts.save(post).await?)
    }

    /// Delete a post together with its comments.
    pub async fn delete_post(&self, id: Uuid, user_id: Uuid) -> Result<Post, DomainError> {
        let post = self.post_for_edit(id, user_id).await?;
        self.posts.delete(post.id).await?;
        Ok(post)
    }
}
