//! Comment add, edit and delete. Every outcome lands back on the post.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::DomainError;
use blogicum_core::forms::CommentForm;
use blogicum_shared::pages::ConfirmDeletePage;

use super::deny_to;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::routes;
use crate::state::AppState;
use crate::views;

/// POST /posts/{id}/comment/
pub async fn add(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let form = form.into_inner();
    match state.blog.add_comment(post_id, identity.user_id, &form).await {
        Ok(comment) => {
            tracing::info!(%post_id, comment_id = %comment.id, author = %identity.username, "Comment added");
            Ok(views::see_other(routes::post_detail(post_id)))
        }
        Err(DomainError::Validation(errors)) => {
            Ok(views::invalid_form(form, &errors, routes::add_comment(post_id)))
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /posts/{id}/edit_comment/{cid}/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = state
        .blog
        .comment_for_edit(post_id, comment_id, identity.user_id)
        .await
        .map_err(deny_to(routes::post_detail(post_id)))?;

    Ok(views::form(
        CommentForm { text: comment.text },
        routes::edit_comment(post_id, comment_id),
    ))
}

/// POST /posts/{id}/edit_comment/{cid}/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let form = form.into_inner();
    match state
        .blog
        .update_comment(post_id, comment_id, identity.user_id, &form)
        .await
    {
        Ok(_) => {
            tracing::info!(%post_id, %comment_id, "Comment updated");
            Ok(views::see_other(routes::post_detail(post_id)))
        }
        Err(DomainError::Validation(errors)) => Ok(views::invalid_form(
            form,
            &errors,
            routes::edit_comment(post_id, comment_id),
        )),
        Err(err) => Err(deny_to(routes::post_detail(post_id))(err)),
    }
}

/// GET /posts/{id}/delete_comment/{cid}/
pub async fn delete_confirm(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = state
        .blog
        .comment_for_edit(post_id, comment_id, identity.user_id)
        .await
        .map_err(deny_to(routes::post_detail(post_id)))?;

    Ok(views::render(&ConfirmDeletePage {
        object: CommentForm { text: comment.text },
        action: routes::delete_comment(post_id, comment_id),
    }))
}

/// POST /posts/{id}/delete_comment/{cid}/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .blog
        .delete_comment(post_id, comment_id, identity.user_id)
        .await
        .map_err(deny_to(routes::post_detail(post_id)))?;

    tracing::info!(%post_id, %comment_id, "Comment deleted");
    Ok(views::see_other(routes::post_detail(post_id)))
}
