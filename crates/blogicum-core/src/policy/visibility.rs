//! Which posts a given viewer may see.
//!
//! A post is publicly visible when it is published, its publication date has
//! passed and its category (if any) is published. Location state plays no
//! part. The author of a post always sees it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Post, PostView};

/// The identity looking at content; anonymous when `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer(Option<Uuid>);

impl Viewer {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn user(user_id: Uuid) -> Self {
        Self(Some(user_id))
    }

    /// True when the viewer is the given user.
    pub fn is(&self, user_id: Uuid) -> bool {
        self.0 == Some(user_id)
    }
}

/// The standard publication rule.
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && post.pub_date <= now && category.is_none_or(|c| c.is_published)
}

/// The publication rule with the owner bypass applied.
pub fn can_view(
    post: &Post,
    category: Option<&Category>,
    viewer: Viewer,
    now: DateTime<Utc>,
) -> bool {
    viewer.is(post.author_id) || is_publicly_visible(post, category, now)
}

impl PostView {
    pub fn is_visible_to(&self, viewer: Viewer, now: DateTime<Utc>) -> bool {
        can_view(&self.post, self.category.as_ref(), viewer, now)
    }
}

/// Which publication states a listing admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Only publicly visible posts as of `now`.
    Public { now: DateTime<Utc> },
    /// Every post regardless of state; used for an author's own profile.
    Everything,
}

/// Declarative description of a post listing.
///
/// Every store backend evaluates a filter the same way: the in-memory store
/// calls [`PostFilter::matches`], the SQL store translates the same fields
/// into a `WHERE` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostFilter {
    pub audience: Audience,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
}

impl PostFilter {
    /// Publicly visible posts as of `now`.
    pub fn published(now: DateTime<Utc>) -> Self {
        Self {
            audience: Audience::Public { now },
            category_id: None,
            author_id: None,
        }
    }

    /// All posts, published or not.
    pub fn everything() -> Self {
        Self {
            audience: Audience::Everything,
            category_id: None,
            author_id: None,
        }
    }

    /// A user's profile listing as seen by `viewer`.
    ///
    /// The owner sees all of their posts; everyone else sees only the
    /// publicly visible ones.
    pub fn profile(owner_id: Uuid, viewer: Viewer, now: DateTime<Utc>) -> Self {
        let base = if viewer.is(owner_id) {
            Self::everything()
        } else {
            Self::published(now)
        };
        base.by_author(owner_id)
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Evaluate the filter against a post and its category.
    pub fn matches(&self, post: &Post, category: Option<&Category>) -> bool {
        if self.category_id.is_some() && post.category_id != self.category_id {
            return false;
        }
        if self.author_id.is_some_and(|id| id != post.author_id) {
            return false;
        }
        match self.audience {
            Audience::Public { now } => is_publicly_visible(post, category, now),
            Audience::Everything => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn post(author_id: Uuid) -> Post {
        Post::new(
            author_id,
            "Title".to_string(),
            "Text".to_string(),
            Utc::now() - TimeDelta::hours(1),
        )
    }

    fn category(is_published: bool) -> Category {
        let mut category = Category::new("Travel".to_string(), "travel".to_string());
        category.is_published = is_published;
        category
    }

    #[test]
    fn published_past_post_without_category_is_visible() {
        let post = post(Uuid::new_v4());
        assert!(is_publicly_visible(&post, None, Utc::now()));
    }

    #[test]
    fn unpublished_post_is_hidden() {
        let mut post = post(Uuid::new_v4());
        post.is_published = false;
        assert!(!is_publicly_visible(&post, None, Utc::now()));
    }

    #[test]
    fn future_post_is_hidden_until_its_date() {
        let now = Utc::now();
        let mut post = post(Uuid::new_v4());
        post.pub_date = now + TimeDelta::days(1);

        assert!(!is_publicly_visible(&post, None, now));
        assert!(is_publicly_visible(&post, None, now + TimeDelta::days(2)));
    }

    #[test]
    fn post_in_unpublished_category_is_hidden() {
        let category = category(false);
        let post = post(Uuid::new_v4()).with_category(Some(category.id));

        assert!(!is_publicly_visible(&post, Some(&category), Utc::now()));
    }

    #[test]
    fn author_bypasses_publication_rule() {
        let author = Uuid::new_v4();
        let category = category(false);
        let mut post = post(author).with_category(Some(category.id));
        post.is_published = false;

        let now = Utc::now();
        assert!(can_view(&post, Some(&category), Viewer::user(author), now));
        assert!(!can_view(&post, Some(&category), Viewer::user(Uuid::new_v4()), now));
        assert!(!can_view(&post, Some(&category), Viewer::anonymous(), now));
    }

    #[test]
    fn profile_filter_depends_on_viewer() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let mut hidden = post(owner);
        hidden.is_published = false;

        let own = PostFilter::profile(owner, Viewer::user(owner), now);
        let other = PostFilter::profile(owner, Viewer::anonymous(), now);

        assert!(own.matches(&hidden, None));
        assert!(!other.matches(&hidden, None));
        assert!(!own.matches(&post(Uuid::new_v4()), None));
    }

    #[test]
    fn category_filter_only_admits_that_category() {
        let travel = category(true);
        let in_travel = post(Uuid::new_v4()).with_category(Some(travel.id));
        let elsewhere = post(Uuid::new_v4());

        let filter = PostFilter::published(Utc::now()).in_category(travel.id);

        assert!(filter.matches(&in_travel, Some(&travel)));
        assert!(!filter.matches(&elsewhere, None));
    }
}
