//! RFC 7807 problem documents for failed requests.
//!
//! See: https://datatracker.ietf.org/doc/html/rfc7807

use serde::{Deserialize, Serialize};

/// A problem document. `type` is always `about:blank`, so `title` is the
/// reason phrase of `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title: String,
    pub status: u16,
    /// What went wrong with this particular request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Validation Failed",
        500 => "Internal Server Error",
        _ => "Error",
    }
}

impl ErrorResponse {
    pub fn for_status(status: u16) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: reason_phrase(status).to_string(),
            status,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
