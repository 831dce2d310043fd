//! Author-only mutation rule for posts and comments.

use uuid::Uuid;

use crate::domain::{Comment, Post};
use crate::error::DomainError;

/// An entity owned by the user who wrote it.
pub trait Authored {
    /// Human-readable entity name used in errors and logs.
    const KIND: &'static str;

    fn author_id(&self) -> Uuid;
}

impl Authored for Post {
    const KIND: &'static str = "post";

    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl Authored for Comment {
    const KIND: &'static str = "comment";

    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

pub fn is_author<T: Authored>(entity: &T, user_id: Uuid) -> bool {
    entity.author_id() == user_id
}

/// Fails with [`DomainError::NotAuthor`] unless `user_id` wrote `entity`.
pub fn ensure_author<T: Authored>(entity: &T, user_id: Uuid) -> Result<(), DomainError> {
    if is_author(entity, user_id) {
        Ok(())
    } else {
        Err(DomainError::NotAuthor(T::KIND))
    }
}
