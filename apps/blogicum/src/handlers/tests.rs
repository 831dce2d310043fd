//! HTTP-level tests against the in-memory store.

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use serde_json::Value;
use std::sync::Arc;

use blogicum_core::Blog;
use blogicum_core::domain::{Category, Comment, Post, User};
use blogicum_core::ports::{BaseRepository, PasswordService, TokenService};
use blogicum_core::services::Repositories;
use blogicum_infra::{
    Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService, PasswordConfig,
};

use super::configure_routes;
use crate::config::SessionConfig;
use crate::middleware::auth::SESSION_COOKIE;
use crate::state::AppState;

fn tokens() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig::default()))
}

fn passwords() -> Arc<dyn PasswordService> {
    let cheap = PasswordConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
    Arc::new(Argon2PasswordService::new(cheap).unwrap())
}

fn setup() -> (Repositories, AppState) {
    let repos = InMemoryStore::new().repositories();
    let state = AppState {
        blog: Blog::new(repos.clone()),
        session: SessionConfig::default(),
        storage: "memory",
    };
    (repos, state)
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(web::Data::new(tokens()))
                .app_data(web::Data::new(passwords()))
                .configure(configure_routes),
        )
        .await
    };
}

fn session(user: &User) -> Cookie<'static> {
    let token = tokens().generate_token(user.id, &user.username).unwrap();
    Cookie::new(SESSION_COOKIE, token)
}

async fn user(repos: &Repositories, username: &str) -> User {
    let user = User::new(username.to_string(), String::new(), "x".into());
    repos.users.save(user).await.unwrap()
}

async fn post(repos: &Repositories, author: &User, title: &str) -> Post {
    let post = Post::new(
        author.id,
        title.to_string(),
        "Body".into(),
        Utc::now() - TimeDelta::hours(1),
    );
    repos.posts.save(post).await.unwrap()
}

fn location(response: &actix_web::dev::ServiceResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn titles(body: &Value) -> Vec<String> {
    body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

#[actix_rt::test]
async fn health_reports_storage() {
    let (_, state) = setup();
    let app = app!(state);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request())
            .await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_rt::test]
async fn index_lists_only_visible_posts() {
    let (repos, state) = setup();
    let author = user(&repos, "alice").await;
    let mut hidden_category = Category::new("Hidden".into(), "hidden".into());
    hidden_category.is_published = false;
    let hidden_category = repos.categories.save(hidden_category).await.unwrap();

    post(&repos, &author, "visible").await;
    let mut draft = post(&repos, &author, "draft").await;
    draft.is_published = false;
    repos.posts.save(draft).await.unwrap();
    let mut scheduled = post(&repos, &author, "scheduled").await;
    scheduled.pub_date = Utc::now() + TimeDelta::days(1);
    repos.posts.save(scheduled).await.unwrap();
    let filed = post(&repos, &author, "filed")
        .await
        .with_category(Some(hidden_category.id));
    repos.posts.save(filed).await.unwrap();

    let app = app!(state);
    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(titles(&body), vec!["visible"]);
}

#[actix_rt::test]
async fn index_pages_clamp() {
    let (repos, state) = setup();
    let author = user(&repos, "alice").await;
    for n in 0..25 {
        post(&repos, &author, &format!("post {n}")).await;
    }
    let app = app!(state);

    let get = |uri: &str| test::TestRequest::get().uri(uri).to_request();

    let first: Value = test::call_and_read_body_json(&app, get("/")).await;
    assert_eq!(first["posts"].as_array().unwrap().len(), 10);
    assert_eq!(first["page"]["num_pages"], 3);

    let third: Value = test::call_and_read_body_json(&app, get("/?page=3")).await;
    assert_eq!(third["posts"].as_array().unwrap().len(), 5);

    let past_end: Value = test::call_and_read_body_json(&app, get("/?page=4")).await;
    assert_eq!(past_end["page"]["number"], 3);
    assert_eq!(past_end["page"]["has_next"], false);

    let garbage: Value = test::call_and_read_body_json(&app, get("/?page=abc")).await;
    assert_eq!(garbage["page"]["number"], 1);
}

#[actix_rt::test]
async fn unpublished_category_page_is_not_found() {
    let (repos, state) = setup();
    let mut category = Category::new("Drafts".into(), "drafts".into());
    category.is_published = false;
    repos.categories.save(category).await.unwrap();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/category/drafts/").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn anonymous_create_redirects_to_login() {
    let (_, state) = setup();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/posts/create/").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login/?next=/posts/create/");
}

#[actix_rt::test]
async fn create_uses_session_user_as_author() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let mallory = user(&repos, "mallory").await;
    let app = app!(state);

    let author_field = mallory.id.to_string();
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .cookie(session(&alice))
            .set_form([
                ("title", "Hello"),
                ("text", "World"),
                ("pub_date", "2024-01-01T10:00"),
                ("author", author_field.as_str()),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/profile/alice/");

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/profile/alice/").to_request(),
    )
    .await;
    assert_eq!(body["posts"][0]["author"]["username"], "alice");
}

#[actix_rt::test]
async fn invalid_post_rerenders_form_with_errors() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .cookie(session(&alice))
            .set_form([("title", ""), ("text", "Body"), ("pub_date", "soon")])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["form"]["text"], "Body");
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["pub_date"].is_array());
}

#[actix_rt::test]
async fn non_author_edit_redirects_and_keeps_post() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let bob = user(&repos, "bob").await;
    let original = post(&repos, &alice, "Original").await;
    let app = app!(state);

    let uri = format!("/posts/{}/edit/", original.id);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .cookie(session(&bob))
            .set_form([
                ("title", "Hijacked"),
                ("text", "Body"),
                ("pub_date", "2024-01-01"),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}/", original.id));

    let stored = repos.posts.find_by_id(original.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Original");
}

#[actix_rt::test]
async fn author_edit_redirects_to_detail() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let original = post(&repos, &alice, "Original").await;
    let app = app!(state);

    let uri = format!("/posts/{}/edit/", original.id);
    let form: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .cookie(session(&alice))
            .to_request(),
    )
    .await;
    assert_eq!(form["form"]["title"], "Original");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .cookie(session(&alice))
            .set_form([
                ("title", "Edited"),
                ("text", "Body"),
                ("pub_date", "2024-01-01"),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}/", original.id));
    let stored = repos.posts.find_by_id(original.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Edited");
}

#[actix_rt::test]
async fn non_author_delete_redirects_to_index() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let bob = user(&repos, "bob").await;
    let target = post(&repos, &alice, "Keep me").await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/delete/", target.id))
            .cookie(session(&bob))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert!(repos.posts.find_by_id(target.id).await.unwrap().is_some());
}

#[actix_rt::test]
async fn author_delete_redirects_to_profile() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let target = post(&repos, &alice, "Bye").await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/delete/", target.id))
            .cookie(session(&alice))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/profile/alice/");
    assert!(repos.posts.find_by_id(target.id).await.unwrap().is_none());
}

#[actix_rt::test]
async fn unpublished_post_detail_is_owner_only() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let bob = user(&repos, "bob").await;
    let mut draft = post(&repos, &alice, "Draft").await;
    draft.is_published = false;
    let draft = repos.posts.save(draft).await.unwrap();
    let app = app!(state);

    let uri = format!("/posts/{}/", draft.id);

    let owner = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .cookie(session(&alice))
            .to_request(),
    )
    .await;
    assert_eq!(owner.status(), StatusCode::OK);
    let body: Value = test::read_body_json(owner).await;
    assert_eq!(body["post"]["title"], "Draft");
    assert!(body["edit_url"].is_string());

    let other = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .cookie(session(&bob))
            .to_request(),
    )
    .await;
    assert_eq!(other.status(), StatusCode::NOT_FOUND);

    let anonymous =
        test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(anonymous.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn malformed_post_id_is_not_found() {
    let (_, state) = setup();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/posts/not-a-uuid/").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn comments_update_the_count() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let bob = user(&repos, "bob").await;
    let target = post(&repos, &alice, "Talk").await;
    let app = app!(state);

    for text in ["one", "two", "three"] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/posts/{}/comment/", target.id))
                .cookie(session(&bob))
                .set_form([("text", text)])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), format!("/posts/{}/", target.id));
    }

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(body["posts"][0]["comment_count"], 3);

    let detail: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", target.id))
            .to_request(),
    )
    .await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 3);
    assert!(detail["comment_action"].is_null());
}

#[actix_rt::test]
async fn blank_comment_is_rejected() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let target = post(&repos, &alice, "Talk").await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", target.id))
            .cookie(session(&alice))
            .set_form([("text", "   ")])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn non_author_cannot_delete_comment() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let bob = user(&repos, "bob").await;
    let target = post(&repos, &alice, "Talk").await;
    let comment = repos
        .comments
        .save(Comment::new(target.id, bob.id, "Mine".into()))
        .await
        .unwrap();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!(
                "/posts/{}/delete_comment/{}/",
                target.id, comment.id
            ))
            .cookie(session(&alice))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}/", target.id));
    assert!(repos.comments.find_by_id(comment.id).await.unwrap().is_some());
}

#[actix_rt::test]
async fn comment_under_wrong_post_is_not_found() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let first = post(&repos, &alice, "First").await;
    let second = post(&repos, &alice, "Second").await;
    let comment = repos
        .comments
        .save(Comment::new(first.id, alice.id, "Here".into()))
        .await
        .unwrap();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/edit_comment/{}/", second.id, comment.id))
            .cookie(session(&alice))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn registration_then_login_sets_session() {
    let (_, state) = setup();
    let app = app!(state);

    let registered = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/registration/")
            .set_form([
                ("username", "carol"),
                ("email", "carol@example.com"),
                ("password", "long enough"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(registered.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&registered), "/auth/login/");

    let logged_in = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login/")
            .set_form([
                ("username", "carol"),
                ("password", "long enough"),
                ("next", "/posts/create/"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(logged_in.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&logged_in), "/posts/create/");

    let cookie = logged_in
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .unwrap();
    assert!(cookie.http_only().unwrap_or(false));

    let create_form = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/posts/create/")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(create_form.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn wrong_password_rerenders_login() {
    let (_, state) = setup();
    let app = app!(state);

    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/registration/")
            .set_form([("username", "dave"), ("password", "correct horse")])
            .to_request(),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login/")
            .set_form([
                ("username", "dave"),
                ("password", "wrong horse"),
                ("next", "https://evil.example/"),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["form"].get("password").is_none());
    assert!(body["errors"]["__all__"].is_array());
}

#[actix_rt::test]
async fn edit_profile_renames_and_reissues_session() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let app = app!(state);

    let form: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/edit_profile/")
            .cookie(session(&alice))
            .to_request(),
    )
    .await;
    assert_eq!(form["form"]["username"], "alice");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/profile/edit_profile/")
            .cookie(session(&alice))
            .set_form([
                ("username", "alice2"),
                ("first_name", "Alice"),
                ("last_name", "Liddell"),
                ("email", "alice@example.com"),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/profile/alice2/");
    let reissued = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap();
    let claims = tokens().validate_token(&reissued).unwrap();
    assert_eq!(claims.username, "alice2");
}

#[actix_rt::test]
async fn own_profile_shows_drafts() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    post(&repos, &alice, "Public").await;
    let mut draft = post(&repos, &alice, "Draft").await;
    draft.is_published = false;
    repos.posts.save(draft).await.unwrap();
    let app = app!(state);

    let own: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/alice/")
            .cookie(session(&alice))
            .to_request(),
    )
    .await;
    assert_eq!(own["is_owner"], true);
    assert_eq!(own["page"]["total"], 2);

    let public: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/profile/alice/").to_request(),
    )
    .await;
    assert_eq!(titles(&public), vec!["Public"]);
}

#[actix_rt::test]
async fn logout_clears_session_cookie() {
    let (_, state) = setup();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/auth/logout/").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap();
    assert_eq!(cleared.value(), "");
}

#[actix_rt::test]
async fn post_redirects_use_the_stored_username() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let stale_session = session(&alice);
    let mut renamed = alice.clone();
    renamed.username = "alice2".into();
    repos.users.save(renamed).await.unwrap();
    let target = post(&repos, &alice, "Bye").await;
    let app = app!(state);

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .cookie(stale_session.clone())
            .set_form([
                ("title", "Hello"),
                ("text", "World"),
                ("pub_date", "2024-01-01T10:00"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&created), "/profile/alice2/");

    let deleted = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/delete/", target.id))
            .cookie(stale_session)
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&deleted), "/profile/alice2/");
}

#[actix_rt::test]
async fn bearer_header_authenticates_despite_invalid_cookie() {
    let (repos, state) = setup();
    let alice = user(&repos, "alice").await;
    let token = tokens().generate_token(alice.id, &alice.username).unwrap();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/posts/create/")
            .cookie(Cookie::new(SESSION_COOKIE, "expired.or.forged"))
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/posts/create/")
            .cookie(Cookie::new(SESSION_COOKIE, "expired.or.forged"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login/?next=/posts/create/");
}
