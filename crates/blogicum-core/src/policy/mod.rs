//! Access rules shared by every read and write path.

pub mod ownership;
pub mod visibility;

pub use ownership::{Authored, ensure_author, is_author};
pub use visibility::{Audience, PostFilter, Viewer, can_view, is_publicly_visible};
