//! # Blogicum Core
//!
//! The domain layer of the blog.
//! Entities, the visibility and ownership rules, pagination, form validation
//! and the `Blog` service. No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod policy;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::Blog;
