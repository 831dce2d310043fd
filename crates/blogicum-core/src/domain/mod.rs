//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod user;
mod views;

pub use category::Category;
pub use comment::Comment;
pub use location::Location;
pub use post::Post;
pub use user::User;
pub use views::{Author, CommentView, PostView};

/// Maximum length of titles and names.
pub const MAX_TITLE_LENGTH: usize = 256;
