//! URL builders for every page, so handlers never format paths by hand.

use std::fmt::Write;

use uuid::Uuid;

pub fn index() -> String {
    "/".to_string()
}

pub fn category(slug: &str) -> String {
    format!("/category/{slug}/")
}

pub fn post_detail(id: Uuid) -> String {
    format!("/posts/{id}/")
}

pub fn create_post() -> String {
    "/posts/create/".to_string()
}

pub fn edit_post(id: Uuid) -> String {
    format!("/posts/{id}/edit/")
}

pub fn delete_post(id: Uuid) -> String {
    format!("/posts/{id}/delete/")
}

pub fn add_comment(post_id: Uuid) -> String {
    format!("/posts/{post_id}/comment/")
}

pub fn edit_comment(post_id: Uuid, comment_id: Uuid) -> String {
    format!("/posts/{post_id}/edit_comment/{comment_id}/")
}

pub fn delete_comment(post_id: Uuid, comment_id: Uuid) -> String {
    format!("/posts/{post_id}/delete_comment/{comment_id}/")
}

pub fn profile(username: &str) -> String {
    format!("/profile/{username}/")
}

pub fn edit_profile() -> String {
    "/profile/edit_profile/".to_string()
}

pub fn registration() -> String {
    "/auth/registration/".to_string()
}

pub fn logout() -> String {
    "/auth/logout/".to_string()
}

/// The login page, remembering where to go afterwards.
pub fn login(next: Option<&str>) -> String {
    match next.and_then(safe_next) {
        Some(next) => format!("/auth/login/?next={}", encode_query_value(next)),
        None => "/auth/login/".to_string(),
    }
}

/// Accept only local absolute paths as post-login targets.
pub fn safe_next(next: &str) -> Option<&str> {
    let local = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    local.then_some(next)
}

fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            _ => {
                let _ = write!(encoded, "%{byte:02X}");
            }
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_keeps_local_next() {
        assert_eq!(
            login(Some("/posts/create/")),
            "/auth/login/?next=/posts/create/"
        );
        assert_eq!(
            login(Some("/profile/a+b/?page=2")),
            "/auth/login/?next=/profile/a%2Bb/%3Fpage%3D2"
        );
    }

    #[test]
    fn login_drops_foreign_next() {
        assert_eq!(login(Some("https://evil.example/")), "/auth/login/");
        assert_eq!(login(Some("//evil.example/")), "/auth/login/");
        assert_eq!(login(None), "/auth/login/");
    }

    #[test]
    fn comment_routes_nest_under_post() {
        let post = Uuid::nil();
        let comment = Uuid::new_v4();
        assert_eq!(
            edit_comment(post, comment),
            format!("/posts/{post}/edit_comment/{comment}/")
        );
    }
}
