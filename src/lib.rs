//! grouprole - Group-scoped roles and permission resolution
//!
//! This is a Domain-Driven Design (DDD) implementation of role based access
//! control for groups: roles are scoped to a group type and bundle (and
//! optionally a single group), and the permissions a group offers are
//! derived from the content bundles installed on it.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;
