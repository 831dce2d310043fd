//! # Blogicum Shared
//!
//! Page contexts handed to the rendering layer and the error document
//! format. Plain serde types with no server dependencies.

pub mod pages;
pub mod response;

pub use response::ErrorResponse;
