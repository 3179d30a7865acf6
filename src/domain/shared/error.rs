//! Domain errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing group scoping, or an id that does not match the derived one
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    /// An entry with the same id is already stored
    #[error("Storage conflict: {0}")]
    StorageConflict(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::StorageConflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }
}
