//! Collaborator ports used while resolving permissions
//!
//! The resolver does not know where group content relations, bundle labels or
//! translated titles come from. It asks these traits, and merges the output
//! of any number of ordered contributors.

use super::catalog::PermissionContributions;
use crate::domain::group_role::GroupRoleBuilder;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::GroupContext;
use std::collections::{BTreeMap, BTreeSet};

/// Content entity type id mapped to the bundle ids installed on a group bundle
pub type GroupContentBundleIds = BTreeMap<String, BTreeSet<String>>;

/// Index of which content bundles belong to which group bundles
#[cfg_attr(test, mockall::automock)]
pub trait GroupContentIndex: Send + Sync {
    fn group_content_bundle_ids_by_group_bundle(
        &self,
        group_type: &str,
        group_bundle: &str,
    ) -> Result<GroupContentBundleIds>;

    /// Whether the bundle is installed as group content on any group bundle
    fn is_group_content(&self, entity_type: &str, bundle: &str) -> bool;
}

/// Human-readable labels of entity types and bundles.
///
/// Unknown types or bundles are reported as `NotFound`.
#[cfg_attr(test, mockall::automock)]
pub trait BundleMetadata: Send + Sync {
    fn bundle_label(&self, entity_type: &str, bundle: &str) -> Result<String>;

    fn plural_label(&self, entity_type: &str) -> Result<String>;
}

/// Fills a title template with the bundle label and the entity type plural label.
///
/// Templates use the `{bundle}` and `{entity_type}` placeholders.
#[cfg_attr(test, mockall::automock)]
pub trait PermissionTitleFormatter: Send + Sync {
    fn format(&self, template: &str, bundle_label: &str, entity_type_label: &str) -> String;
}

/// When a contributor runs relative to the resolver's own CRUD contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStage {
    Before,
    After,
}

/// Contributes permissions to the catalog of a group context
pub trait PermissionProvider: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Add entries; names already in the catalog keep their first entry
    fn contribute(
        &self,
        context: &GroupContext,
        contributions: &mut PermissionContributions<'_>,
    ) -> Result<()>;
}

/// Contributes default roles provisioned with every group of a context
pub trait DefaultRoleProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Append unsaved role drafts; drafts are scoped to `context` afterwards
    fn contribute(&self, context: &GroupContext, roles: &mut Vec<GroupRoleBuilder>) -> Result<()>;
}
