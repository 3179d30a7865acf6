//! Group permission domain

pub mod catalog;
pub mod entry;
pub mod provider;
pub mod resolver;

pub use catalog::{PermissionCatalog, PermissionContributions};
pub use entry::{
    CrudPermissionDefinition, EntityOperation, EntityOperationPermission, GroupPermission,
    Ownership, PermissionEntry,
};
pub use provider::{
    BundleMetadata, DefaultRoleProvider, GroupContentBundleIds, GroupContentIndex,
    PermissionProvider, PermissionTitleFormatter, ProviderStage,
};
pub use resolver::PermissionResolver;
