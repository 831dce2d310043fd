//! Paginated post listings: front page and category pages.

use actix_web::{HttpResponse, web};

use blogicum_core::pagination::PageRequest;
use blogicum_shared::pages::{CategoryPage, IndexPage};

use super::PageQuery;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views;

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .blog
        .index(PageRequest::parse(query.page.as_deref()))
        .await?;

    Ok(views::render(&IndexPage {
        posts: views::post_cards(&page),
        page: views::page_meta(&page),
    }))
}

/// GET /category/{slug}/
pub async fn category(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let listing = state
        .blog
        .category_posts(&path, PageRequest::parse(query.page.as_deref()))
        .await?;

    Ok(views::render(&CategoryPage {
        category: views::category_link(&listing.category),
        posts: views::post_cards(&listing.page),
        page: views::page_meta(&listing.page),
    }))
}
