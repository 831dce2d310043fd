//! In-memory store - used when no database is configured and in tests.
//!
//! All tables live behind one async `RwLock` so that joins (category flags,
//! authors, comment counts) see a consistent snapshot.
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{
    Author, Category, Comment, CommentView, Location, Post, PostView, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::policy::PostFilter;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};
use blogicum_core::services::Repositories;


#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn category_of(&self, post: &Post) -> Option<&Category> {
        post.category_id.and_then(|id| self.categories.get(&id))
    }

    fn post_view(&self, post: &Post) -> Option<PostView> {
        let author = self.users.get(&post.author_id)?;
        Some(PostView {
            post: post.clone(),
            author: Author::from(author),
            category: self.category_of(post).cloned(),
            location: post
                .location_id
                .and_then(|id| self.locations.get(&id))
                .cloned(),
            comment_count: self
                .comments
                .values()
                .filter(|c| c.post_id == post.id)
                .count() as u64,
        })
    }

    fn matching_posts<'a>(&'a self, filter: &'a PostFilter) -> impl Iterator<Item = &'a Post> {
        self.posts
            .values()
            .filter(move |post| filter.matches(post, self.category_of(post)))
    }
}

/// A row type stored in one of the [`Tables`].
trait Row: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Unique-constraint check against the other rows.
    fn conflicts(&self, _tables: &Tables) -> Option<String> {
        None
    }

    /// Foreign-key side effects of deleting the row with `id`.
    fn on_delete(_tables: &mut Tables, _id: Uuid) {}
}

impl Row for User {
    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.users
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }
    fn conflicts(&self, tables: &Tables) -> Option<String> {
        tables
            .users
            .values()
            .any(|u| u.id != self.id && u.username == self.username)
            .then(|| format!("username {} already taken", self.username))
    }
    fn on_delete(tables: &mut Tables, id: Uuid) {
        let posts: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in posts {
            Post::on_delete(tables, post_id);
            tables.posts.remove(&post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
    }
}

impl Row for Category {
    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.categories
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.categories
    }
    fn conflicts(&self, tables: &Tables) -> Option<String> {
        tables
            .categories
            .values()
            .any(|c| c.id != self.id && c.slug == self.slug)
            .then(|| format!("slug {} already taken", self.slug))
    }
    fn on_delete(tables: &mut Tables, id: Uuid) {
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
    }
}

impl Row for Location {
    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.locations
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.locations
    }
    fn on_delete(tables: &mut Tables, id: Uuid) {
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
    }
}

impl Row for Post {
    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }
    fn conflicts(&self, tables: &Tables) -> Option<String> {
        (!tables.users.contains_key(&self.author_id))
            .then(|| format!("author {} does not exist", self.author_id))
    }
    fn on_delete(tables: &mut Tables, id: Uuid) {
        tables.comments.retain(|_, c| c.post_id != id);
    }
}

impl Row for Comment {
    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }
    fn conflicts(&self, tables: &Tables) -> Option<String> {
        if !tables.posts.contains_key(&self.post_id) {
            return Some(format!("post {} does not exist", self.post_id));
        }
        (!tables.users.contains_key(&self.author_id))
            .then(|| format!("author {} does not exist", self.author_id))
    }
}

/// In-memory implementation of every repository port.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository handles that all share this store.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            categories: Arc::new(self.clone()),
            locations: Arc::new(self.clone()),
            posts: Arc::new(self.clone()),
            comments: Arc::new(self.clone()),
        }
    }
}

#[async_trait]
impl<T: Row> BaseRepository<T, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(conflict) = entity.conflicts(&tables) {
            return Err(RepoError::Constraint(conflict));
        }
        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if T::table_mut(&mut tables).remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        T::on_delete(&mut tables, id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).and_then(|post| tables.post_view(post)))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.matching_posts(filter).count() as u64)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostView>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables.matching_posts(filter).collect();
        posts.sort_by(|a, b| {
            b.pub_date
                .cmp(&a.pub_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .filter_map(|post| tables.post_view(post))
            .collect())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| c.created_at);

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                let author = tables.users.get(&comment.author_id)?;
                Some(CommentView {
                    comment: comment.clone(),
                    author: Author::from(author),
                })
            })
            .collect())
    }
}
