//! Group role entity
//!
//! A role is drafted through [`GroupRoleBuilder`], which performs no
//! validation. [`GroupRoleBuilder::prepare`] validates the draft and derives
//! the canonical id; [`GroupRoleBuilder::save`] additionally inserts the
//! result into a [`GroupRoleRepository`]. A [`GroupRole`] therefore always
//! carries a canonical id.

use super::identifier::{derive_role_id, role_name_from_id};
use super::repository::GroupRoleRepository;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Well-known name of the role every group is provisioned with
pub const ADMINISTRATOR_ROLE: &str = "administrator";

/// A validated, group-scoped role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "GroupRoleRecord", try_from = "GroupRoleRecord")]
pub struct GroupRole {
    id: String,
    name: String,
    label: String,
    group_type: String,
    group_bundle: String,
    group_id: Option<String>,
    is_admin: bool,
    weight: i32,
    permissions: BTreeSet<String>,
}

/// Persisted representation of a group role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRoleRecord {
    pub id: String,
    pub name: String,
    pub label: String,
    pub group_type: String,
    pub group_bundle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub weight: i32,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Initial attributes for [`GroupRole::create_from`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRoleValues {
    pub id: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub group_type: Option<String>,
    pub group_bundle: Option<String>,
    pub group_id: Option<String>,
    pub is_admin: bool,
    pub weight: i32,
    pub permissions: Vec<String>,
}

/// Unsaved, freely mutable role draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRoleBuilder {
    id: Option<String>,
    name: Option<String>,
    label: Option<String>,
    group_type: Option<String>,
    group_bundle: Option<String>,
    group_id: Option<String>,
    is_admin: bool,
    weight: i32,
    permissions: BTreeSet<String>,
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl GroupRoleBuilder {
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = Some(id.into());
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    pub fn set_group_type(&mut self, group_type: impl Into<String>) -> &mut Self {
        self.group_type = Some(group_type.into());
        self
    }

    pub fn set_group_bundle(&mut self, group_bundle: impl Into<String>) -> &mut Self {
        self.group_bundle = Some(group_bundle.into());
        self
    }

    /// Scope the role to a single group. An empty id scopes it to all groups.
    pub fn set_group_id(&mut self, group_id: impl Into<String>) -> &mut Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn set_admin(&mut self, is_admin: bool) -> &mut Self {
        self.is_admin = is_admin;
        self
    }

    pub fn set_weight(&mut self, weight: i32) -> &mut Self {
        self.weight = weight;
        self
    }

    pub fn grant_permission(&mut self, permission: impl Into<String>) -> &mut Self {
        self.permissions.insert(permission.into());
        self
    }

    pub fn grant_permissions<I, S>(&mut self, permissions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn revoke_permission(&mut self, permission: &str) -> &mut Self {
        self.permissions.remove(permission);
        self
    }

    /// Grant every permission mapped to `true`, revoke every one mapped to `false`
    pub fn change_permissions<I, S>(&mut self, changes: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        for (permission, granted) in changes {
            let permission = permission.into();
            if granted {
                self.permissions.insert(permission);
            } else {
                self.permissions.remove(&permission);
            }
        }
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn group_type(&self) -> Option<&str> {
        self.group_type.as_deref()
    }

    pub fn group_bundle(&self) -> Option<&str> {
        self.group_bundle.as_deref()
    }

    pub fn group_id(&self) -> Option<&str> {
        filled(&self.group_id)
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    /// Validate the draft and derive its canonical id without touching storage
    pub fn prepare(&self) -> Result<GroupRole> {
        let (group_type, group_bundle) =
            match (filled(&self.group_type), filled(&self.group_bundle)) {
                (Some(group_type), Some(group_bundle)) => (group_type, group_bundle),
                _ => {
                    return Err(DomainError::ConfigurationInvalid(
                        "group roles require both a group type and a group bundle".to_string(),
                    ))
                }
            };
        let group_id = self.group_id();
        let explicit_id = filled(&self.id);

        let name = match (filled(&self.name), explicit_id) {
            (Some(name), _) => name,
            (None, Some(id)) => role_name_from_id(id, group_type, group_bundle, group_id)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    DomainError::ConfigurationInvalid(format!(
                        "role id '{}' does not name a role of {}:{}",
                        id, group_type, group_bundle
                    ))
                })?,
            (None, None) => {
                return Err(DomainError::ConfigurationInvalid(
                    "group roles require a name or an id".to_string(),
                ))
            }
        };

        let canonical = derive_role_id(group_type, group_bundle, group_id, name);
        if let Some(id) = explicit_id {
            if id != canonical {
                return Err(DomainError::ConfigurationInvalid(format!(
                    "role id '{}' does not match the expected id '{}'",
                    id, canonical
                )));
            }
        }

        Ok(GroupRole {
            id: canonical,
            name: name.to_string(),
            label: filled(&self.label).unwrap_or(name).to_string(),
            group_type: group_type.to_string(),
            group_bundle: group_bundle.to_string(),
            group_id: group_id.map(str::to_string),
            is_admin: self.is_admin,
            weight: self.weight,
            permissions: self.permissions.clone(),
        })
    }

    /// Validate the draft and insert it as a new role
    pub async fn save<R>(&self, repository: &R) -> Result<GroupRole>
    where
        R: GroupRoleRepository + ?Sized,
    {
        let role = self.prepare()?;

        match repository.insert(&role).await {
            Ok(()) => {
                counter!("group_roles_saved_total").increment(1);
                info!(
                    role_id = %role.id,
                    permissions = role.permissions.len(),
                    "Group role saved"
                );
                Ok(role)
            }
            Err(err) => {
                if err.is_conflict() {
                    counter!("group_role_conflicts_total").increment(1);
                    warn!(role_id = %role.id, "Group role already exists");
                }
                Err(err)
            }
        }
    }

    /// Validate the draft and replace the stored role with the same id
    pub async fn update<R>(&self, repository: &R) -> Result<GroupRole>
    where
        R: GroupRoleRepository + ?Sized,
    {
        let role = self.prepare()?;
        repository.update(&role).await?;
        debug!(role_id = %role.id, "Group role updated");
        Ok(role)
    }
}

impl From<GroupRoleValues> for GroupRoleBuilder {
    fn from(values: GroupRoleValues) -> Self {
        Self {
            id: values.id,
            name: values.name,
            label: values.label,
            group_type: values.group_type,
            group_bundle: values.group_bundle,
            group_id: values.group_id,
            is_admin: values.is_admin,
            weight: values.weight,
            permissions: values.permissions.into_iter().collect(),
        }
    }
}

impl GroupRole {
    /// Start an empty role draft
    pub fn create() -> GroupRoleBuilder {
        GroupRoleBuilder::default()
    }

    /// Start a role draft from initial attributes
    pub fn create_from(values: GroupRoleValues) -> GroupRoleBuilder {
        values.into()
    }

    /// Load a role by id; a missing role is `Ok(None)`
    pub async fn load<R>(repository: &R, id: &str) -> Result<Option<GroupRole>>
    where
        R: GroupRoleRepository + ?Sized,
    {
        repository.get(id).await
    }

    pub async fn load_by_scope<R>(
        repository: &R,
        group_type: &str,
        group_bundle: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<GroupRole>>
    where
        R: GroupRoleRepository + ?Sized,
    {
        let group_id = group_id.filter(|id| !id.is_empty()).map(str::to_string);
        repository
            .list_by_scope(group_type, group_bundle, group_id)
            .await
    }

    pub async fn delete<R>(repository: &R, id: &str) -> Result<bool>
    where
        R: GroupRoleRepository + ?Sized,
    {
        let deleted = repository.delete(id).await?;
        if deleted {
            info!(role_id = %id, "Group role deleted");
        }
        Ok(deleted)
    }

    /// Reopen the role as a draft, keeping its id
    pub fn to_builder(&self) -> GroupRoleBuilder {
        GroupRoleBuilder {
            id: Some(self.id.clone()),
            name: Some(self.name.clone()),
            label: Some(self.label.clone()),
            group_type: Some(self.group_type.clone()),
            group_bundle: Some(self.group_bundle.clone()),
            group_id: self.group_id.clone(),
            is_admin: self.is_admin,
            weight: self.weight,
            permissions: self.permissions.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn group_type(&self) -> &str {
        &self.group_type
    }

    pub fn group_bundle(&self) -> &str {
        &self.group_bundle
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

impl From<GroupRole> for GroupRoleRecord {
    fn from(role: GroupRole) -> Self {
        Self {
            id: role.id,
            name: role.name,
            label: role.label,
            group_type: role.group_type,
            group_bundle: role.group_bundle,
            group_id: role.group_id,
            is_admin: role.is_admin,
            weight: role.weight,
            permissions: role.permissions.into_iter().collect(),
        }
    }
}

impl TryFrom<GroupRoleRecord> for GroupRole {
    type Error = DomainError;

    /// Restores a stored role, rejecting records whose id is not canonical
    fn try_from(record: GroupRoleRecord) -> Result<Self> {
        let mut builder = GroupRole::create();
        builder
            .set_id(record.id)
            .set_name(record.name)
            .set_label(record.label)
            .set_group_type(record.group_type)
            .set_group_bundle(record.group_bundle)
            .set_admin(record.is_admin)
            .set_weight(record.weight)
            .grant_permissions(record.permissions);
        if let Some(group_id) = record.group_id {
            builder.set_group_id(group_id);
        }
        builder.prepare()
    }
}
