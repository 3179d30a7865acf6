//! Domain result type

use super::error::DomainError;

/// Standard result type for domain operations
pub type Result<T> = std::result::Result<T, DomainError>;

/// Turns a missing lookup into a `NotFound` error
pub trait OptionExt<T> {
    fn or_not_found(self, what: impl FnOnce() -> String) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, what: impl FnOnce() -> String) -> Result<T> {
        self.ok_or_else(|| DomainError::NotFound(what()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_not_found() {
        let present: Option<u8> = Some(1);
        assert_eq!(present.or_not_found(|| "unused".into()), Ok(1));

        let missing: Option<u8> = None;
        let err = missing.or_not_found(|| "bundle node:blog".into()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Entity not found: bundle node:blog");
    }
}
