//! PostgreSQL repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use blogicum_core::domain::{Author, Category, CommentView, PostView, User};
use blogicum_core::error::RepoError;
use blogicum_core::policy::{Audience, PostFilter};
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use blogicum_core::services::Repositories;

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Builds every repository over one shared connection pool.
pub struct PostgresStore;

impl PostgresStore {
    pub fn repositories(db: DbConn) -> Repositories {
        let db = Arc::new(db);
        Repositories {
            users: Arc::new(PostgresUserRepository::shared(Arc::clone(&db))),
            categories: Arc::new(PostgresCategoryRepository::shared(Arc::clone(&db))),
            locations: Arc::new(PostgresLocationRepository::shared(Arc::clone(&db))),
            posts: Arc::new(PostgresPostRepository::shared(Arc::clone(&db))),
            comments: Arc::new(PostgresCommentRepository::shared(db)),
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.conn())
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.conn())
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {}

/// `WHERE` clause equivalent of [`PostFilter::matches`].
fn filter_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(category_id) = filter.category_id {
        condition = condition.add(post::Column::CategoryId.eq(category_id));
    }
    if let Some(author_id) = filter.author_id {
        condition = condition.add(post::Column::AuthorId.eq(author_id));
    }
    if let Audience::Public { now } = filter.audience {
        condition = condition
            .add(post::Column::IsPublished.eq(true))
            .add(post::Column::PubDate.lte(now))
            .add(
                Condition::any()
                    .add(post::Column::CategoryId.is_null())
                    .add(category::Column::IsPublished.eq(true)),
            );
    }
    condition
}

/// Posts left-joined with their category so the category flag can be tested.
fn filtered_posts(filter: &PostFilter) -> Select<PostEntity> {
    PostEntity::find()
        .join(JoinType::LeftJoin, post::Relation::Category.def())
        .filter(filter_condition(filter))
}

#[derive(Debug, FromQueryResult)]
struct CommentCount {
    post_id: Uuid,
    comment_count: i64,
}

fn unique_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

async fn load_authors(db: &DbConn, ids: Vec<Uuid>) -> Result<HashMap<Uuid, Author>, RepoError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = UserEntity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(query_error)?;

    Ok(users
        .into_iter()
        .map(|model| {
            let user = User::from(model);
            (user.id, Author::from(&user))
        })
        .collect())
}

impl PostgresPostRepository {
    /// Number of comments per post, in one grouped query.
    async fn comment_counts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = CommentEntity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(comment::Column::Id.count(), "comment_count")
            .filter(comment::Column::PostId.is_in(post_ids.to_vec()))
            .group_by(comment::Column::PostId)
            .into_model::<CommentCount>()
            .all(self.conn())
            .await
            .map_err(query_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.post_id, row.comment_count.max(0) as u64))
            .collect())
    }

    /// Attach authors, categories, locations and comment counts to a page of
    /// posts with one query per related table.
    async fn hydrate(&self, posts: Vec<post::Model>) -> Result<Vec<PostView>, RepoError> {
        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let authors =
            load_authors(self.conn(), unique_ids(posts.iter().map(|p| p.author_id))).await?;

        let category_ids = unique_ids(posts.iter().filter_map(|p| p.category_id));
        let categories: HashMap<Uuid, category::Model> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            CategoryEntity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(self.conn())
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        let location_ids = unique_ids(posts.iter().filter_map(|p| p.location_id));
        let locations: HashMap<Uuid, location::Model> = if location_ids.is_empty() {
            HashMap::new()
        } else {
            LocationEntity::find()
                .filter(location::Column::Id.is_in(location_ids))
                .all(self.conn())
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|l| (l.id, l))
                .collect()
        };

        let counts = self.comment_counts(&post_ids).await?;

        posts
            .into_iter()
            .map(|model| {
                let author = authors.get(&model.author_id).cloned().ok_or_else(|| {
                    RepoError::Constraint(format!("post {} has no author", model.id))
                })?;
                let category = model
                    .category_id
                    .and_then(|id| categories.get(&id).cloned())
                    .map(Into::into);
                let location = model
                    .location_id
                    .and_then(|id| locations.get(&id).cloned())
                    .map(Into::into);
                let comment_count = counts.get(&model.id).copied().unwrap_or(0);
                Ok(PostView {
                    post: model.into(),
                    author,
                    category,
                    location,
                    comment_count,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        Ok(self.hydrate(vec![model]).await?.pop())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        filtered_posts(filter)
            .count(self.conn())
            .await
            .map_err(query_error)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostView>, RepoError> {
        tracing::debug!(?filter, offset, limit, "Listing posts");

        let posts = filtered_posts(filter)
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.conn())
            .await
            .map_err(query_error)?;

        self.hydrate(posts).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let comments = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(self.conn())
            .await
            .map_err(query_error)?;

        let authors =
            load_authors(self.conn(), unique_ids(comments.iter().map(|c| c.author_id))).await?;

        comments
            .into_iter()
            .map(|model| {
                let author = authors.get(&model.author_id).cloned().ok_or_else(|| {
                    RepoError::Constraint(format!("comment {} has no author", model.id))
                })?;
                Ok(CommentView {
                    comment: model.into(),
                    author,
                })
            })
            .collect()
    }
}
