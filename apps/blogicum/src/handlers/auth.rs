//! Login, logout and registration.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;
use std::sync::Arc;

use blogicum_core::DomainError;
use blogicum_core::domain::User;
use blogicum_core::forms::{LoginForm, RegistrationForm};
use blogicum_core::ports::{PasswordService, TokenService};

use crate::middleware::auth::SESSION_COOKIE;
use crate::middleware::error::AppResult;
use crate::routes;
use crate::state::AppState;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Issue a fresh session cookie for `user`.
pub(super) fn session_cookie(
    state: &AppState,
    tokens: &dyn TokenService,
    user: &User,
) -> AppResult<Cookie<'static>> {
    let token = tokens.generate_token(user.id, &user.username)?;
    Ok(Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.session.cookie_secure)
        .max_age(Duration::seconds(tokens.expiration_seconds()))
        .finish())
}

/// GET /auth/login/
pub async fn login_form(query: web::Query<LoginQuery>) -> HttpResponse {
    let form = LoginForm {
        next: query
            .next
            .as_deref()
            .and_then(routes::safe_next)
            .unwrap_or_default()
            .to_string(),
        ..Default::default()
    };
    views::form(form, routes::login(None))
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    tokens: web::Data<Arc<dyn TokenService>>,
    passwords: web::Data<Arc<dyn PasswordService>>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let user = match state.blog.authenticate(&form, passwords.get_ref().as_ref()).await {
        Ok(user) => user,
        Err(DomainError::Validation(errors)) => {
            tracing::warn!(username = %form.username, "Failed login attempt");
            return Ok(views::invalid_form(form, &errors, routes::login(None)));
        }
        Err(err) => return Err(err.into()),
    };

    let cookie = session_cookie(&state, tokens.get_ref().as_ref(), &user)?;
    let next = routes::safe_next(&form.next)
        .map(str::to_string)
        .unwrap_or_else(routes::index);

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, next))
        .cookie(cookie)
        .finish())
}

/// POST /auth/logout/
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, routes::index()))
        .cookie(cookie)
        .finish()
}

/// GET /auth/registration/
pub async fn registration_form() -> HttpResponse {
    views::form(RegistrationForm::default(), routes::registration())
}

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    passwords: web::Data<Arc<dyn PasswordService>>,
    form: web::Form<RegistrationForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    match state.blog.register(&form, passwords.get_ref().as_ref()).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "User registered");
            Ok(views::see_other(routes::login(None)))
        }
        Err(DomainError::Validation(errors)) => {
            Ok(views::invalid_form(form, &errors, routes::registration()))
        }
        Err(err) => Err(err.into()),
    }
}
