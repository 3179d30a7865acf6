//! Shared value objects used across multiple bounded contexts

use serde::{Deserialize, Serialize};
use std::fmt;

/// A group entity type together with one of its bundles.
///
/// This is the context every permission and default role is resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupContext {
    group_type: String,
    group_bundle: String,
}

impl GroupContext {
    pub fn new(group_type: impl Into<String>, group_bundle: impl Into<String>) -> Self {
        Self {
            group_type: group_type.into(),
            group_bundle: group_bundle.into(),
        }
    }

    pub fn group_type(&self) -> &str {
        &self.group_type
    }

    pub fn group_bundle(&self) -> &str {
        &self.group_bundle
    }
}

impl fmt::Display for GroupContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_type, self.group_bundle)
    }
}

/// A content entity type together with one of its bundles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentBundle {
    pub entity_type: String,
    pub bundle: String,
}

impl ContentBundle {
    pub fn new(entity_type: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.into(),
        }
    }
}

impl fmt::Display for ContentBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.bundle)
    }
}
