//! Shared kernel - Common types used by the role and permission contexts

pub mod error;
pub mod events;
pub mod result;
pub mod value_objects;

pub use error::DomainError;
pub use result::{OptionExt, Result};
pub use value_objects::*;
