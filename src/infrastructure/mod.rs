//! Infrastructure layer - Adapters for storage, configuration-backed metadata
//! and telemetry

pub mod contributors;
pub mod persistence;
pub mod registry;
pub mod telemetry;

pub use contributors::{ConfiguredDefaultRoles, ConfiguredPermissions, PlaceholderTitleFormatter};
pub use registry::ConfiguredRegistry;
