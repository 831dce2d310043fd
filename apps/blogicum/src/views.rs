//! Turning domain read models into page contexts and responses.

use actix_web::{HttpResponse, http::header};
use serde::Serialize;

use blogicum_core::domain::{Author, Category, CommentView, PostView, User};
use blogicum_core::forms::FormErrors;
use blogicum_core::pagination::Page;
use blogicum_core::policy::Viewer;
use blogicum_shared::pages::{
    AuthorLink, CategoryLink, CommentItem, FieldErrors, FormPage, PageMeta, PostCard, ProfileCard,
};

use crate::routes;

pub fn author_link(author: &Author) -> AuthorLink {
    AuthorLink {
        username: author.username.clone(),
        display_name: author.display_name.clone(),
        url: routes::profile(&author.username),
    }
}

pub fn category_link(category: &Category) -> CategoryLink {
    CategoryLink {
        title: category.title.clone(),
        slug: category.slug.clone(),
        url: routes::category(&category.slug),
    }
}

pub fn post_card(view: &PostView) -> PostCard {
    let post = &view.post;
    PostCard {
        id: post.id,
        title: post.title.clone(),
        text: post.text.clone(),
        pub_date: post.pub_date.to_rfc3339(),
        author: author_link(&view.author),
        category: view.category.as_ref().map(category_link),
        location: view
            .location
            .as_ref()
            .filter(|l| l.is_published)
            .map(|l| l.name.clone()),
        is_published: post.is_published,
        comment_count: view.comment_count,
        url: routes::post_detail(post.id),
    }
}

pub fn page_meta<T>(page: &Page<T>) -> PageMeta {
    PageMeta {
        number: page.number,
        num_pages: page.num_pages,
        total: page.total,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        next_page: page.next_number(),
        previous_page: page.previous_number(),
    }
}

pub fn post_cards(page: &Page<PostView>) -> Vec<PostCard> {
    page.items.iter().map(post_card).collect()
}

pub fn profile_card(user: &User) -> ProfileCard {
    ProfileCard {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        date_joined: user.created_at.to_rfc3339(),
    }
}

/// A comment; edit and delete links only for its author.
pub fn comment_item(view: &CommentView, viewer: Viewer) -> CommentItem {
    let comment = &view.comment;
    let own = viewer.is(comment.author_id);
    CommentItem {
        id: comment.id,
        text: comment.text.clone(),
        author: author_link(&view.author),
        created_at: comment.created_at.to_rfc3339(),
        edit_url: own.then(|| routes::edit_comment(comment.post_id, comment.id)),
        delete_url: own.then(|| routes::delete_comment(comment.post_id, comment.id)),
    }
}

pub fn field_errors(errors: &FormErrors) -> FieldErrors {
    errors
        .iter()
        .map(|(field, messages)| (field.to_string(), messages.to_vec()))
        .collect()
}

pub fn render<T: Serialize>(page: &T) -> HttpResponse {
    HttpResponse::Ok().json(page)
}

/// A blank or prefilled form.
pub fn form<F: Serialize>(form: F, action: String) -> HttpResponse {
    render(&FormPage {
        form,
        errors: FieldErrors::new(),
        action,
    })
}

/// Re-show a rejected submission with its field errors.
pub fn invalid_form<F: Serialize>(form: F, errors: &FormErrors, action: String) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(FormPage {
        form,
        errors: field_errors(errors),
        action,
    })
}

pub fn see_other(location: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
