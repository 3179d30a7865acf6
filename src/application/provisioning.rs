//! Group provisioning use case
//!
//! Materializes the default roles of a group bundle (or of one group) with
//! the permissions whose default roles name them.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::group_role::{GroupRole, GroupRoleEvent, GroupRoleRepository};
use crate::domain::permission::PermissionResolver;
use crate::domain::shared::result::{OptionExt, Result};

/// Outcome of one provisioning run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisioningReport {
    /// Roles inserted by this run
    pub created: Vec<GroupRole>,
    /// Ids of roles that already existed
    pub skipped: Vec<String>,
    pub events: Vec<GroupRoleEvent>,
}

impl ProvisioningReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
    }
}

pub struct GroupProvisioningService {
    resolver: Arc<PermissionResolver>,
    repository: Arc<dyn GroupRoleRepository>,
}

impl GroupProvisioningService {
    pub fn new(resolver: Arc<PermissionResolver>, repository: Arc<dyn GroupRoleRepository>) -> Self {
        Self {
            resolver,
            repository,
        }
    }

    /// Save the default roles of a group bundle.
    ///
    /// Roles whose id is already taken are skipped, so running this twice is
    /// harmless. Any other failure aborts the run; roles saved before it stay.
    pub async fn provision(
        &self,
        group_type: &str,
        group_bundle: &str,
        group_id: Option<&str>,
    ) -> Result<ProvisioningReport> {
        let catalog = self.resolver.resolve_permissions(group_type, group_bundle)?;
        let roles = self.resolver.default_roles(group_type, group_bundle)?;

        let mut report = ProvisioningReport::default();
        for mut draft in roles {
            if let Some(group_id) = group_id {
                draft.set_group_id(group_id);
            }
            let prepared = draft.prepare()?;
            draft.grant_permissions(catalog.default_permissions_for(prepared.name()));

            match draft.save(&*self.repository).await {
                Ok(role) => {
                    report.events.push(GroupRoleEvent::created(
                        role.id(),
                        role.is_admin(),
                        role.permissions().len(),
                    ));
                    report.created.push(role);
                }
                Err(err) if err.is_conflict() => {
                    debug!(role_id = %prepared.id(), "Default role already provisioned");
                    report.skipped.push(prepared.id().to_string());
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            group_type,
            group_bundle,
            group_id = group_id.unwrap_or("-"),
            created = report.created.len(),
            skipped = report.skipped.len(),
            "Group provisioned"
        );
        Ok(report)
    }
    /// Grant (`true`) or revoke (`false`) permissions of a stored role
    pub async fn change_permissions(
        &self,
        role_id: &str,
        changes: &BTreeMap<String, bool>,
    ) -> Result<GroupRoleEvent> {
        let role = GroupRole::load(&*self.repository, role_id)
            .await?
            .or_not_found(|| format!("group role '{}'", role_id))?;

        let mut draft = role.to_builder();
        draft.change_permissions(changes.iter().map(|(name, granted)| (name.as_str(), *granted)));
        let updated = draft.update(&*self.repository).await?;

        let granted = updated
            .permissions()
            .difference(role.permissions())
            .cloned()
            .collect();
        let revoked = role
            .permissions()
            .difference(updated.permissions())
            .cloned()
            .collect();
        Ok(GroupRoleEvent::updated(updated.id(), granted, revoked))
    }

    /// Delete a stored role; `None` when it did not exist
    pub async fn remove(&self, role_id: &str) -> Result<Option<GroupRoleEvent>> {
        let deleted = GroupRole::delete(&*self.repository, role_id).await?;
        Ok(deleted.then(|| GroupRoleEvent::deleted(role_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfiguredRole};
    use crate::domain::group_role::repository::MockGroupRoleRepository;
    use crate::domain::shared::error::DomainError;
    use crate::infrastructure::persistence::InMemoryGroupRoleRepository;
    use crate::infrastructure::{
        ConfiguredDefaultRoles, ConfiguredPermissions, ConfiguredRegistry,
        PlaceholderTitleFormatter,
    };

    const CONFIG: &str = r#"
        [[permissions.permissions]]
        name = "view group"
        title = "View group"
        default_roles = ["member"]

        [[permissions.default_roles]]
        name = "member"
        label = "Member"
        weight = 1

        [[registry.entity_types]]
        id = "node"
        label = "Content"
        plural_label = "content items"
        bundles = { article = "Article" }

        [[registry.group_content]]
        group_type = "group"
        group_bundle = "club"
        entity_type = "node"
        bundle = "article"
    "#;

    fn resolver(roles: Vec<ConfiguredRole>) -> Arc<PermissionResolver> {
        let config = Config::from_toml_str(CONFIG).unwrap();
        let registry = Arc::new(ConfiguredRegistry::from_config(&config.registry).unwrap());
        let roles = if roles.is_empty() {
            config.permissions.default_roles.clone()
        } else {
            roles
        };
        Arc::new(
            PermissionResolver::new(registry.clone(), registry, Arc::new(PlaceholderTitleFormatter))
                .with_permission_provider(
                    crate::domain::permission::ProviderStage::After,
                    Arc::new(ConfiguredPermissions::new(config.permissions.permissions.clone())),
                )
                .with_default_role_provider(Arc::new(ConfiguredDefaultRoles::new(roles))),
        )
    }

    #[tokio::test]
    async fn test_provision_grants_default_permissions() {
        let repository = Arc::new(InMemoryGroupRoleRepository::new());
        let service = GroupProvisioningService::new(resolver(Vec::new()), repository.clone());

        let report = service.provision("group", "club", None).await.unwrap();

        assert_eq!(report.created.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(report.events.len(), 2);

        let admin = repository.get("group-club-administrator").await.unwrap().unwrap();
        assert!(admin.is_admin());
        assert_eq!(admin.permissions().len(), 5);
        assert!(admin.has_permission("update any article node"));
        assert!(!admin.has_permission("view group"));

        let member = repository.get("group-club-member").await.unwrap().unwrap();
        assert_eq!(member.label(), "Member");
        assert!(member.has_permission("view group"));
        assert_eq!(member.permissions().len(), 1);
    }

    #[tokio::test]
    async fn test_provision_twice_skips_existing_roles() {
        let repository = Arc::new(InMemoryGroupRoleRepository::new());
        let service = GroupProvisioningService::new(resolver(Vec::new()), repository.clone());

        service.provision("group", "club", None).await.unwrap();
        let second = service.provision("group", "club", None).await.unwrap();

        assert!(second.is_noop());
        assert!(second.events.is_empty());
        assert_eq!(
            second.skipped,
            vec!["group-club-administrator", "group-club-member"]
        );
        assert_eq!(repository.len().await, 2);
    }

    #[tokio::test]
    async fn test_provision_single_group() {
        let repository = Arc::new(InMemoryGroupRoleRepository::new());
        let service = GroupProvisioningService::new(resolver(Vec::new()), repository.clone());

        let report = service.provision("group", "club", Some("42")).await.unwrap();
        let ids: Vec<_> = report.created.iter().map(GroupRole::id).collect();
        assert_eq!(ids, vec!["group-club-42-administrator", "group-club-42-member"]);
        assert_eq!(report.events[0].role_id(), "group-club-42-administrator");
    }

    #[tokio::test]
    async fn test_invalid_default_role_aborts() {
        let roles = vec![ConfiguredRole {
            name: String::new(),
            ..Default::default()
        }];
        let repository = Arc::new(InMemoryGroupRoleRepository::new());
        let service = GroupProvisioningService::new(resolver(roles), repository.clone());

        let err = service.provision("group", "club", None).await.unwrap_err();
        assert!(matches!(err, DomainError::ConfigurationInvalid(_)));
        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn test_storage_failure_aborts() {
        let mut repository = MockGroupRoleRepository::new();
        repository
            .expect_insert()
            .times(1)
            .returning(|_| Err(DomainError::Internal("connection reset".to_string())));

        let service = GroupProvisioningService::new(resolver(Vec::new()), Arc::new(repository));
        let err = service.provision("group", "club", None).await.unwrap_err();
        assert_eq!(err, DomainError::Internal("connection reset".to_string()));
    }

    #[tokio::test]
    async fn test_change_permissions_reports_diff() {
        let repository = Arc::new(InMemoryGroupRoleRepository::new());
        let service = GroupProvisioningService::new(resolver(Vec::new()), repository.clone());
        service.provision("group", "club", None).await.unwrap();

        let changes = BTreeMap::from([
            ("view group".to_string(), false),
            ("create article node".to_string(), true),
            ("leave group".to_string(), false),
        ]);
        let event = service
            .change_permissions("group-club-member", &changes)
            .await
            .unwrap();

        match event {
            GroupRoleEvent::Updated(updated) => {
                assert_eq!(updated.granted, vec!["create article node"]);
                assert_eq!(updated.revoked, vec!["view group"]);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        let member = repository.get("group-club-member").await.unwrap().unwrap();
        assert!(member.has_permission("create article node"));
        assert!(!member.has_permission("view group"));
    }

    #[tokio::test]
    async fn test_change_permissions_of_missing_role() {
        let service = GroupProvisioningService::new(
            resolver(Vec::new()),
            Arc::new(InMemoryGroupRoleRepository::new()),
        );
        let err = service
            .change_permissions("group-club-member", &BTreeMap::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove() {
        let repository = Arc::new(InMemoryGroupRoleRepository::new());
        let service = GroupProvisioningService::new(resolver(Vec::new()), repository.clone());
        service.provision("group", "club", None).await.unwrap();

        let event = service.remove("group-club-member").await.unwrap().unwrap();
        assert_eq!(event.role_id(), "group-club-member");
        assert!(service.remove("group-club-member").await.unwrap().is_none());
        assert_eq!(repository.len().await, 1);
    }
}
