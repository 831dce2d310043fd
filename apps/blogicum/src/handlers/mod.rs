//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod listing;
mod posts;
mod profile;

#[cfg(test)]
mod tests;

use actix_web::web;
use blogicum_core::DomainError;
use serde::Deserialize;

use crate::middleware::error::AppError;

/// `?page=` on listing routes; parsed leniently by `PageRequest::parse`.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Map an ownership denial to a redirect to `fallback`; every other error
/// keeps its usual response.
fn deny_to(fallback: String) -> impl FnOnce(DomainError) -> AppError {
    move |err| match err {
        DomainError::NotAuthor(kind) => {
            tracing::warn!(kind, redirect = %fallback, "Change refused: requester is not the author");
            AppError::Redirect(fallback)
        }
        other => other.into(),
    }
}

/// Configure all application routes.
///
/// Literal segments (`create`, `edit_profile`) are registered before the
/// parameterised routes they would otherwise collide with.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/", web::get().to(listing::index))
        .route("/category/{slug}/", web::get().to(listing::category))
        .service(
            web::scope("/posts")
                .service(
                    web::resource("/create/")
                        .route(web::get().to(posts::create_form))
                        .route(web::post().to(posts::create)),
                )
                .route("/{id}/", web::get().to(posts::detail))
                .service(
                    web::resource("/{id}/edit/")
                        .route(web::get().to(posts::edit_form))
                        .route(web::post().to(posts::edit)),
                )
                .service(
                    web::resource("/{id}/delete/")
                        .route(web::get().to(posts::delete_confirm))
                        .route(web::post().to(posts::delete)),
                )
                .route("/{id}/comment/", web::post().to(comments::add))
                .service(
                    web::resource("/{id}/edit_comment/{cid}/")
                        .route(web::get().to(comments::edit_form))
                        .route(web::post().to(comments::edit)),
                )
                .service(
                    web::resource("/{id}/delete_comment/{cid}/")
                        .route(web::get().to(comments::delete_confirm))
                        .route(web::post().to(comments::delete)),
                ),
        )
        .service(
            web::scope("/profile")
                .service(
                    web::resource("/edit_profile/")
                        .route(web::get().to(profile::edit_form))
                        .route(web::post().to(profile::edit)),
                )
                .route("/{username}/", web::get().to(profile::show)),
        )
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .route("/logout/", web::post().to(auth::logout))
                .service(
                    web::resource("/registration/")
                        .route(web::get().to(auth::registration_form))
                        .route(web::post().to(auth::register)),
                ),
        );
}
