//! Permission and default role contributors declared in configuration

use tracing::debug;

use crate::config::{ConfiguredPermission, ConfiguredRole};
use crate::domain::group_role::{GroupRole, GroupRoleBuilder};
use crate::domain::permission::{
    DefaultRoleProvider, GroupPermission, PermissionContributions, PermissionProvider,
    PermissionTitleFormatter,
};
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::GroupContext;

/// Substitutes `{bundle}` and `{entity_type}` in permission title templates
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderTitleFormatter;

impl PermissionTitleFormatter for PlaceholderTitleFormatter {
    fn format(&self, template: &str, bundle_label: &str, entity_type_label: &str) -> String {
        template
            .replace("{bundle}", bundle_label)
            .replace("{entity_type}", entity_type_label)
    }
}

/// Contributes the `[[permissions.permissions]]` entries matching a context
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPermissions {
    permissions: Vec<ConfiguredPermission>,
}

impl ConfiguredPermissions {
    pub fn new(permissions: Vec<ConfiguredPermission>) -> Self {
        Self { permissions }
    }
}

impl PermissionProvider for ConfiguredPermissions {
    fn name(&self) -> &str {
        "configured_permissions"
    }

    fn contribute(
        &self,
        context: &GroupContext,
        contributions: &mut PermissionContributions<'_>,
    ) -> Result<()> {
        for configured in self
            .permissions
            .iter()
            .filter(|p| p.applies_to(context.group_type(), context.group_bundle()))
        {
            let mut permission = GroupPermission::new(configured.name.as_str(), configured.title.as_str())
                .with_restrict_access(configured.restrict_access);
            if let Some(description) = &configured.description {
                permission = permission.with_description(description.as_str());
            }
            for role in &configured.default_roles {
                permission = permission.with_default_role(role.as_str());
            }

            if !contributions.insert_if_absent(permission) {
                debug!(%context, permission = %configured.name, "Configured permission shadowed");
            }
        }
        Ok(())
    }
}

/// Contributes the `[[permissions.default_roles]]` entries matching a context
#[derive(Debug, Clone, Default)]
pub struct ConfiguredDefaultRoles {
    roles: Vec<ConfiguredRole>,
}

impl ConfiguredDefaultRoles {
    pub fn new(roles: Vec<ConfiguredRole>) -> Self {
        Self { roles }
    }
}

impl DefaultRoleProvider for ConfiguredDefaultRoles {
    fn name(&self) -> &str {
        "configured_default_roles"
    }

    fn contribute(&self, context: &GroupContext, roles: &mut Vec<GroupRoleBuilder>) -> Result<()> {
        for configured in self
            .roles
            .iter()
            .filter(|r| r.applies_to(context.group_type(), context.group_bundle()))
        {
            let mut role = GroupRole::create();
            role.set_name(configured.name.as_str())
                .set_weight(configured.weight);
            if let Some(label) = &configured.label {
                role.set_label(label.as_str());
            }
            roles.push(role);
        }
        Ok(())
    }
}
