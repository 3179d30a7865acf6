//! Permission resolution engine
//!
//! Given a group type and bundle, the resolver enumerates the content bundles
//! installed on it, derives create/update/delete permissions for each, and
//! merges them with the entries of registered contributors. It also builds the
//! default roles a new group of that bundle is provisioned with.

use super::catalog::{PermissionCatalog, PermissionContributions};
use super::entry::{CrudPermissionDefinition, EntityOperation, EntityOperationPermission, Ownership};
use super::provider::{
    BundleMetadata, DefaultRoleProvider, GroupContentBundleIds, GroupContentIndex,
    PermissionProvider, PermissionTitleFormatter, ProviderStage,
};
use crate::domain::group_role::{GroupRole, GroupRoleBuilder, ADMINISTRATOR_ROLE};
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::GroupContext;
use metrics::counter;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Title templates of the five permissions derived per content bundle
const CRUD_TEMPLATES: [(EntityOperation, Option<Ownership>, &str); 5] = [
    (EntityOperation::Create, None, "{bundle}: Create new {entity_type}"),
    (EntityOperation::Update, Some(Ownership::Own), "{bundle}: Edit own {entity_type}"),
    (EntityOperation::Update, Some(Ownership::Any), "{bundle}: Edit any {entity_type}"),
    (EntityOperation::Delete, Some(Ownership::Own), "{bundle}: Delete own {entity_type}"),
    (EntityOperation::Delete, Some(Ownership::Any), "{bundle}: Delete any {entity_type}"),
];

const DEFAULT_ADMINISTRATOR_LABEL: &str = "Administrator";

pub struct PermissionResolver {
    content_index: Arc<dyn GroupContentIndex>,
    metadata: Arc<dyn BundleMetadata>,
    formatter: Arc<dyn PermissionTitleFormatter>,
    providers: Vec<(ProviderStage, Arc<dyn PermissionProvider>)>,
    role_providers: Vec<Arc<dyn DefaultRoleProvider>>,
    admin_role: String,
    admin_label: String,
}

impl PermissionResolver {
    pub fn new(
        content_index: Arc<dyn GroupContentIndex>,
        metadata: Arc<dyn BundleMetadata>,
        formatter: Arc<dyn PermissionTitleFormatter>,
    ) -> Self {
        Self {
            content_index,
            metadata,
            formatter,
            providers: Vec::new(),
            role_providers: Vec::new(),
            admin_role: ADMINISTRATOR_ROLE.to_string(),
            admin_label: DEFAULT_ADMINISTRATOR_LABEL.to_string(),
        }
    }

    /// Override the name and label of the administrator role
    pub fn with_administrator(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.admin_role = name.into();
        self.admin_label = label.into();
        self
    }

    /// Register a permission contributor; contributors of a stage run in
    /// registration order
    pub fn with_permission_provider(
        mut self,
        stage: ProviderStage,
        provider: Arc<dyn PermissionProvider>,
    ) -> Self {
        self.providers.push((stage, provider));
        self
    }

    pub fn with_default_role_provider(mut self, provider: Arc<dyn DefaultRoleProvider>) -> Self {
        self.role_providers.push(provider);
        self
    }

    pub fn administrator_role_name(&self) -> &str {
        &self.admin_role
    }

    /// The five CRUD permissions of one content bundle
    fn crud_permissions(&self, entity_type: &str, bundle: &str) -> Result<Vec<EntityOperationPermission>> {
        let bundle_label = self.metadata.bundle_label(entity_type, bundle)?;
        let plural_label = self.metadata.plural_label(entity_type)?;

        Ok(CRUD_TEMPLATES
            .iter()
            .map(|(operation, ownership, template)| {
                EntityOperationPermission::new(*operation, *ownership, entity_type, bundle)
                    .with_title(self.formatter.format(template, &bundle_label, &plural_label))
                    .with_default_role(self.admin_role.as_str())
            })
            .collect())
    }

    /// Entity-operation permissions for every (entity type, bundle) pair,
    /// keyed by permission name
    pub fn default_entity_operation_permissions(
        &self,
        group_content_bundle_ids: &GroupContentBundleIds,
    ) -> Result<BTreeMap<String, EntityOperationPermission>> {
        let mut permissions = BTreeMap::new();
        for (entity_type, bundles) in group_content_bundle_ids {
            for bundle in bundles {
                for permission in self.crud_permissions(entity_type, bundle)? {
                    permissions.entry(permission.name()).or_insert(permission);
                }
            }
        }
        Ok(permissions)
    }

    /// CRUD permissions of one content bundle, or nothing if the bundle is
    /// not group content
    pub fn generate_crud_permission_list(
        &self,
        entity_type: &str,
        bundle: &str,
    ) -> Result<BTreeMap<String, CrudPermissionDefinition>> {
        if !self.content_index.is_group_content(entity_type, bundle) {
            debug!(entity_type, bundle, "Bundle is not group content, no CRUD permissions");
            return Ok(BTreeMap::new());
        }

        Ok(self
            .crud_permissions(entity_type, bundle)?
            .iter()
            .map(|permission| (permission.name(), CrudPermissionDefinition::from(permission)))
            .collect())
    }

    /// Union of the CRUD permission lists of every content bundle installed on
    /// a group bundle
    pub fn permission_list(
        &self,
        group_type: &str,
        group_bundle: &str,
    ) -> Result<BTreeMap<String, CrudPermissionDefinition>> {
        let bundle_ids = self
            .content_index
            .group_content_bundle_ids_by_group_bundle(group_type, group_bundle)?;

        let mut permissions = BTreeMap::new();
        for (entity_type, bundles) in &bundle_ids {
            for bundle in bundles {
                for (name, definition) in self.generate_crud_permission_list(entity_type, bundle)? {
                    permissions.entry(name).or_insert(definition);
                }
            }
        }
        Ok(permissions)
    }

    /// Full permission catalog of a group bundle.
    ///
    /// `Before` contributors run first, then the derived CRUD permissions are
    /// added, then `After` contributors. Every insert keeps an existing entry.
    pub fn resolve_permissions(&self, group_type: &str, group_bundle: &str) -> Result<PermissionCatalog> {
        let context = GroupContext::new(group_type, group_bundle);
        let mut catalog = PermissionCatalog::new();

        self.run_providers(ProviderStage::Before, &context, &mut catalog)?;

        let bundle_ids = self
            .content_index
            .group_content_bundle_ids_by_group_bundle(group_type, group_bundle)?;
        for permission in self.default_entity_operation_permissions(&bundle_ids)?.into_values() {
            catalog.insert_if_absent(permission);
        }

        self.run_providers(ProviderStage::After, &context, &mut catalog)?;

        counter!("group_permissions_resolved_total").increment(catalog.len() as u64);
        debug!(%context, permissions = catalog.len(), "Resolved group permissions");
        Ok(catalog)
    }

    fn run_providers(
        &self,
        stage: ProviderStage,
        context: &GroupContext,
        catalog: &mut PermissionCatalog,
    ) -> Result<()> {
        for (_, provider) in self.providers.iter().filter(|(s, _)| *s == stage) {
            let mut contributions = PermissionContributions::new(&mut *catalog);
            provider.contribute(context, &mut contributions)?;
            debug!(
                provider = provider.name(),
                added = contributions.added(),
                "Permission provider contributed"
            );
        }
        Ok(())
    }

    /// Unsaved administrator role for a group bundle
    pub fn administrator_role(&self, context: &GroupContext) -> GroupRoleBuilder {
        let mut role = GroupRole::create();
        role.set_name(self.admin_role.as_str())
            .set_label(self.admin_label.as_str())
            .set_group_type(context.group_type())
            .set_group_bundle(context.group_bundle())
            .set_admin(true);
        role
    }

    /// Default roles of a group bundle, administrator first.
    ///
    /// Contributed drafts are scoped to the group bundle and deduplicated by
    /// name, keeping the first. Nothing is saved.
    pub fn default_roles(&self, group_type: &str, group_bundle: &str) -> Result<Vec<GroupRoleBuilder>> {
        let context = GroupContext::new(group_type, group_bundle);
        let mut contributed = Vec::new();
        for provider in &self.role_providers {
            provider.contribute(&context, &mut contributed)?;
        }

        let mut seen = BTreeSet::new();
        let mut roles = Vec::with_capacity(contributed.len() + 1);
        for mut role in std::iter::once(self.administrator_role(&context)).chain(contributed) {
            role.set_group_type(group_type).set_group_bundle(group_bundle);
            let name = role.prepare()?.name().to_string();
            if seen.insert(name.clone()) {
                roles.push(role);
            } else {
                warn!(%context, role = %name, "Duplicate default role ignored");
            }
        }
        Ok(roles)
    }
}
