//! Post pages: create, detail, edit and delete.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::DomainError;
use blogicum_core::forms::PostForm;
use blogicum_shared::pages::{ConfirmDeletePage, PostDetailPage};

use super::deny_to;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::routes;
use crate::state::AppState;
use crate::views;

/// Profile URL of the stored user; the session may carry an older username.
async fn own_profile(state: &AppState, user_id: Uuid) -> AppResult<String> {
    let user = state.blog.current_user(user_id).await?;
    Ok(routes::profile(&user.username))
}

/// GET /posts/create/
pub async fn create_form(_identity: Identity) -> HttpResponse {
    views::form(PostForm::default(), routes::create_post())
}

/// POST /posts/create/
///
/// The author is always the session user; an `author` field in the body is
/// ignored.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    match state.blog.create_post(identity.user_id, &form).await {
        Ok(post) => {
            tracing::info!(post_id = %post.id, author = %identity.user_id, "Post created");
            Ok(views::see_other(own_profile(&state, identity.user_id).await?))
        }
        Err(DomainError::Validation(errors)) => {
            Ok(views::invalid_form(form, &errors, routes::create_post()))
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /posts/{id}/
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let viewer = identity.viewer();
    let detail = state.blog.post_detail(id, viewer).await?;
    let own = viewer.is(detail.post.post.author_id);

    Ok(views::render(&PostDetailPage {
        post: views::post_card(&detail.post),
        comments: detail
            .comments
            .iter()
            .map(|c| views::comment_item(c, viewer))
            .collect(),
        comment_action: identity.0.is_some().then(|| routes::add_comment(id)),
        edit_url: own.then(|| routes::edit_post(id)),
        delete_url: own.then(|| routes::delete_post(id)),
    }))
}

/// GET /posts/{id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .blog
        .post_for_edit(id, identity.user_id)
        .await
        .map_err(deny_to(routes::post_detail(id)))?;

    Ok(views::form(PostForm::from_post(&post), routes::edit_post(id)))
}

/// POST /posts/{id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let form = form.into_inner();
    match state.blog.update_post(id, identity.user_id, &form).await {
        Ok(_) => {
            tracing::info!(post_id = %id, author = %identity.username, "Post updated");
            Ok(views::see_other(routes::post_detail(id)))
        }
        Err(DomainError::Validation(errors)) => {
            Ok(views::invalid_form(form, &errors, routes::edit_post(id)))
        }
        Err(err) => Err(deny_to(routes::post_detail(id))(err)),
    }
}

/// GET /posts/{id}/delete/
pub async fn delete_confirm(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .blog
        .post_for_edit(id, identity.user_id)
        .await
        .map_err(deny_to(routes::index()))?;

    Ok(views::render(&ConfirmDeletePage {
        object: PostForm::from_post(&post),
        action: routes::delete_post(id),
    }))
}

/// POST /posts/{id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state
        .blog
        .delete_post(id, identity.user_id)
        .await
        .map_err(deny_to(routes::index()))?;

    tracing::info!(post_id = %id, author = %identity.user_id, "Post deleted");
    Ok(views::see_other(own_profile(&state, identity.user_id).await?))
}
