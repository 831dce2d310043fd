//! Profile pages.

use actix_web::{HttpResponse, http::header, web};
use std::sync::Arc;

use blogicum_core::DomainError;
use blogicum_core::forms::ProfileForm;
use blogicum_core::pagination::PageRequest;
use blogicum_core::ports::TokenService;
use blogicum_shared::pages::ProfilePage;

use super::PageQuery;
use super::auth::session_cookie;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::routes;
use crate::state::AppState;
use crate::views;

/// GET /profile/{username}/
///
/// The owner sees all of their posts, including drafts and scheduled ones.
pub async fn show(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    let listing = state
        .blog
        .profile(&path, viewer, PageRequest::parse(query.page.as_deref()))
        .await?;

    Ok(views::render(&ProfilePage {
        profile: views::profile_card(&listing.profile),
        is_owner: viewer.is(listing.profile.id),
        posts: views::post_cards(&listing.page),
        page: views::page_meta(&listing.page),
    }))
}

/// GET /profile/edit_profile/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = state.blog.current_user(identity.user_id).await?;
    Ok(views::form(ProfileForm::from_user(&user), routes::edit_profile()))
}

/// POST /profile/edit_profile/
///
/// A renamed user gets a new session token carrying the new username.
pub async fn edit(
    state: web::Data<AppState>,
    tokens: web::Data<Arc<dyn TokenService>>,
    identity: Identity,
    form: web::Form<ProfileForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let user = match state.blog.update_profile(identity.user_id, &form).await {
        Ok(user) => user,
        Err(DomainError::Validation(errors)) => {
            return Ok(views::invalid_form(form, &errors, routes::edit_profile()));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "Profile updated");
    let cookie = session_cookie(&state, tokens.get_ref().as_ref(), &user)?;
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, routes::profile(&user.username)))
        .cookie(cookie)
        .finish())
}
