//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - Entities: group roles and their canonical identifiers
//! - Value Objects: permission entries, group contexts
//! - Domain Services: the permission resolver
//! - Repository Interfaces: ports for role storage and content metadata
//! - Domain Events: role lifecycle events

pub mod group_role;
pub mod permission;
pub mod shared;

// Re-export commonly used types
pub use shared::{DomainError, Result};
