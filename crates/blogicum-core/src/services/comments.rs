use chrono::Utc;
use uuid::Uuid;

use super::Blog;
use crate::domain::Comment;
use crate::error::DomainError;
use crate::forms::CommentForm;
use crate::policy::{Viewer, ensure_author};
use crate::ports::BaseRepository;

impl Blog {
    /// Comment on a post. Only posts the author can see accept comments.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        form: &CommentForm,
    ) -> Result<Comment, DomainError> {
        let visible = self
            .posts
            .find_view(post_id)
            .await?
            .is_some_and(|view| view.is_visible_to(Viewer::user(author_id), Utc::now()));
        if !visible {
            return Err(DomainError::not_found("post", post_id));
        }

        let text = form.clean().map_err(DomainError::Validation)?;
        let comment = Comment::new(post_id, author_id, text);
        Ok(self.comments.save(comment).await?)
    }

    /// Load a comment of `post_id` its author is about to change.
    pub async fn comment_for_edit(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Comment, DomainError> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;
        ensure_author(&comment, user_id)?;
        Ok(comment)
    }

    pub async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
        form: &CommentForm,
    ) -> Result<Comment, DomainError> {
        let mut comment = self.comment_for_edit(post_id, comment_id, user_id).await?;
        comment.text = form.clean().map_err(DomainError::Validation)?;
        Ok(self.comments.save(comment).await?)
    }

    pub async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Comment, DomainError> {
        let comment = self.comment_for_edit(post_id, comment_id, user_id).await?;
        self.comments.delete(comment.id).await?;
        Ok(comment)
    }
}
