//! Session extractors.
//!
//! The session token travels in the `blogicum_session` cookie set at login,
//! or in an `Authorization: Bearer` header for scripted clients.

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use std::sync::Arc;
use uuid::Uuid;

use blogicum_core::policy::Viewer;
use blogicum_core::ports::{AuthError, TokenClaims, TokenService};

use crate::routes;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "blogicum_session";

/// Authenticated user identity extractor.
///
/// Handlers taking an `Identity` are login-required: without a valid
/// session the request is redirected to the login page.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl Identity {
    pub fn viewer(&self) -> Viewer {
        Viewer::user(self.user_id)
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Rejection for login-required routes; answers with a redirect to login.
#[derive(Debug, thiserror::Error)]
#[error("login required for {next}: {reason}")]
pub struct LoginRequired {
    next: String,
    reason: AuthError,
}

impl actix_web::ResponseError for LoginRequired {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, routes::login(Some(&self.next))))
            .finish()
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

/// Validate the session cookie, then the bearer header.
///
/// A stale cookie does not shadow a valid header; when neither validates the
/// cookie's error is reported.
fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let token_service = req
        .app_data::<web::Data<Arc<dyn TokenService>>>()
        .ok_or_else(|| {
            tracing::error!("TokenService not found in app data");
            AuthError::InvalidToken("Server configuration error".to_string())
        })?;

    let from_header = || bearer_token(req).and_then(|token| token_service.validate_token(token));

    let claims = match req.cookie(SESSION_COOKIE) {
        Some(cookie) => match token_service.validate_token(cookie.value()) {
            Ok(claims) => Ok(claims),
            Err(cookie_err) => from_header().map_err(|_| cookie_err),
        },
        None => from_header(),
    }?;

    Ok(Identity::from(claims))
}

impl FromRequest for Identity {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|reason| {
            tracing::debug!(path = %req.path(), %reason, "Login required");
            LoginRequired {
                next: req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| req.path().to_string()),
                reason,
            }
        }))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn viewer(&self) -> Viewer {
        self.0
            .as_ref()
            .map(Identity::viewer)
            .unwrap_or_else(Viewer::anonymous)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}
