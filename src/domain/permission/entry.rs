//! Permission entries
//!
//! A permission is either generic (named freely by whoever contributes it) or
//! derived from an operation on a group content bundle, in which case its name
//! follows the `"{operation}[ {ownership}] {bundle} {entity_type}"` format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Generic group permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPermission {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Role names receiving this permission when a group is provisioned
    #[serde(default)]
    pub default_roles: BTreeSet<String>,
    #[serde(default)]
    pub restrict_access: bool,
}

impl GroupPermission {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: None,
            default_roles: BTreeSet::new(),
            restrict_access: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_roles.insert(role.into());
        self
    }

    pub fn with_restrict_access(mut self, restrict_access: bool) -> Self {
        self.restrict_access = restrict_access;
        self
    }
}

/// Operation an entity-operation permission grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityOperation {
    Create,
    Update,
    Delete,
}

impl EntityOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityOperation::Create => "create",
            EntityOperation::Update => "update",
            EntityOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for EntityOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whose entities an update or delete permission covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    Own,
    Any,
}

impl Ownership {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ownership::Own => "own",
            Ownership::Any => "any",
        }
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission to perform one operation on one group content bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOperationPermission {
    pub entity_type: String,
    pub bundle: String,
    pub operation: EntityOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<Ownership>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub default_roles: BTreeSet<String>,
    #[serde(default)]
    pub restrict_access: bool,
}

impl EntityOperationPermission {
    pub(crate) fn new(
        operation: EntityOperation,
        ownership: Option<Ownership>,
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.into(),
            operation,
            ownership,
            title: String::new(),
            description: None,
            default_roles: BTreeSet::new(),
            restrict_access: false,
        }
    }

    /// Create permission; creation has no ownership
    pub fn create(entity_type: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self::new(EntityOperation::Create, None, entity_type, bundle)
    }

    pub fn update(
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
        ownership: Ownership,
    ) -> Self {
        Self::new(EntityOperation::Update, Some(ownership), entity_type, bundle)
    }

    pub fn delete(
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
        ownership: Ownership,
    ) -> Self {
        Self::new(EntityOperation::Delete, Some(ownership), entity_type, bundle)
    }

    /// Canonical permission name, e.g. `update own article node`
    pub fn name(&self) -> String {
        match self.ownership {
            Some(ownership) => format!(
                "{} {} {} {}",
                self.operation, ownership, self.bundle, self.entity_type
            ),
            None => format!("{} {} {}", self.operation, self.bundle, self.entity_type),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_roles.insert(role.into());
        self
    }

    pub fn with_restrict_access(mut self, restrict_access: bool) -> Self {
        self.restrict_access = restrict_access;
        self
    }
}

/// Any entry of a permission catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PermissionEntry {
    Generic(GroupPermission),
    EntityOperation(EntityOperationPermission),
}

impl PermissionEntry {
    pub fn name(&self) -> String {
        match self {
            PermissionEntry::Generic(p) => p.name.clone(),
            PermissionEntry::EntityOperation(p) => p.name(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            PermissionEntry::Generic(p) => &p.title,
            PermissionEntry::EntityOperation(p) => &p.title,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            PermissionEntry::Generic(p) => p.description.as_deref(),
            PermissionEntry::EntityOperation(p) => p.description.as_deref(),
        }
    }

    pub fn default_roles(&self) -> &BTreeSet<String> {
        match self {
            PermissionEntry::Generic(p) => &p.default_roles,
            PermissionEntry::EntityOperation(p) => &p.default_roles,
        }
    }

    pub fn restrict_access(&self) -> bool {
        match self {
            PermissionEntry::Generic(p) => p.restrict_access,
            PermissionEntry::EntityOperation(p) => p.restrict_access,
        }
    }
}

impl From<GroupPermission> for PermissionEntry {
    fn from(permission: GroupPermission) -> Self {
        PermissionEntry::Generic(permission)
    }
}

impl From<EntityOperationPermission> for PermissionEntry {
    fn from(permission: EntityOperationPermission) -> Self {
        PermissionEntry::EntityOperation(permission)
    }
}

/// Lightweight CRUD permission shape: a title and the one role receiving it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrudPermissionDefinition {
    pub title: String,
    pub default_role: String,
}

impl From<&EntityOperationPermission> for CrudPermissionDefinition {
    fn from(permission: &EntityOperationPermission) -> Self {
        Self {
            title: permission.title.clone(),
            default_role: permission
                .default_roles
                .iter()
                .next()
                .cloned()
                .unwrap_or_default(),
        }
    }
}
