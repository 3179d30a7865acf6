//! Configuration management
//!
//! Values are layered: serde defaults, then an optional TOML file, then
//! `GROUPROLE__SECTION__KEY` environment variables.

use crate::domain::group_role::ADMINISTRATOR_ROLE;
use config::{ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config/grouprole";

const ENV_PREFIX: &str = "GROUPROLE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub permissions: PermissionsConfig,
    pub database: DatabaseSettings,
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    pub administrator_role: String,
    pub administrator_label: String,
    /// Extra permissions contributed after the derived CRUD permissions
    pub permissions: Vec<ConfiguredPermission>,
    /// Extra default roles provisioned with every matching group
    pub default_roles: Vec<ConfiguredRole>,
}

/// Permission declared in configuration.
///
/// `group_type` / `group_bundle` restrict it to matching group contexts; when
/// absent it applies to every context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfiguredPermission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_bundle: Option<String>,
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub default_roles: Vec<String>,
    pub restrict_access: bool,
}

/// Default role declared in configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfiguredRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_bundle: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub weight: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Only used with the `postgres` feature
    pub url: String,
    /// Use the PostgreSQL role repository instead of the in-memory one
    pub enabled: bool,
}

/// Entity types, bundles and group content relations known to the
/// configuration-backed registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub entity_types: Vec<EntityTypeConfig>,
    pub group_content: Vec<GroupContentConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTypeConfig {
    pub id: String,
    pub label: String,
    pub plural_label: String,
    /// Bundle id to bundle label
    pub bundles: BTreeMap<String, String>,
}

/// A content bundle installed on a group bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupContentConfig {
    pub group_type: String,
    pub group_bundle: String,
    pub entity_type: String,
    pub bundle: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            administrator_role: ADMINISTRATOR_ROLE.to_string(),
            administrator_label: "Administrator".to_string(),
            permissions: Vec::new(),
            default_roles: Vec::new(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://postgres@localhost/grouprole".to_string(),
            enabled: false,
        }
    }
}

impl ConfiguredPermission {
    pub fn applies_to(&self, group_type: &str, group_bundle: &str) -> bool {
        matches_scope(&self.group_type, &self.group_bundle, group_type, group_bundle)
    }
}

impl ConfiguredRole {
    pub fn applies_to(&self, group_type: &str, group_bundle: &str) -> bool {
        matches_scope(&self.group_type, &self.group_bundle, group_type, group_bundle)
    }
}

fn matches_scope(
    want_type: &Option<String>,
    want_bundle: &Option<String>,
    group_type: &str,
    group_bundle: &str,
) -> bool {
    want_type.as_deref().map_or(true, |t| t == group_type)
        && want_bundle.as_deref().map_or(true, |b| b == group_bundle)
}

impl Config {
    /// Load from `path` (or the default file, if present) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        config::Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Parse a TOML document, without consulting the environment
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Group bundles that have at least one content bundle installed
    pub fn group_bundles(&self) -> Vec<(String, String)> {
        let mut bundles: Vec<(String, String)> = self
            .registry
            .group_content
            .iter()
            .map(|relation| (relation.group_type.clone(), relation.group_bundle.clone()))
            .collect();
        bundles.sort();
        bundles.dedup();
        bundles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [logging]
        level = "debug"

        [permissions]
        administrator_role = "owner"
        administrator_label = "Owner"

        [[permissions.permissions]]
        name = "view group"
        title = "View group"
        default_roles = ["owner", "member"]

        [[permissions.default_roles]]
        group_bundle = "club"
        name = "member"
        label = "Member"

        [[registry.entity_types]]
        id = "node"
        label = "Content"
        plural_label = "content items"
        bundles = { article = "Article", page = "Basic page" }

        [[registry.group_content]]
        group_type = "group"
        group_bundle = "club"
        entity_type = "node"
        bundle = "article"
    "#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.permissions.administrator_role, ADMINISTRATOR_ROLE);
        assert!(!config.database.enabled);
        assert!(config.registry.entity_types.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.permissions.administrator_role, "owner");
        assert_eq!(config.permissions.permissions[0].default_roles, vec!["owner", "member"]);
        assert!(!config.permissions.permissions[0].restrict_access);

        let node = &config.registry.entity_types[0];
        assert_eq!(node.plural_label, "content items");
        assert_eq!(node.bundles.get("page").map(String::as_str), Some("Basic page"));
        assert_eq!(config.group_bundles(), vec![("group".to_string(), "club".to_string())]);
    }

    #[test]
    fn test_database_settings_from_toml() {
        let config = Config::from_toml_str(
            "[database]\nurl = \"postgres://roles@db.internal/grouprole\"\nenabled = true\n",
        )
        .unwrap();
        let database: &DatabaseSettings = &config.database;
        assert!(database.enabled);
        assert_eq!(database.url, "postgres://roles@db.internal/grouprole");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_toml_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.permissions.administrator_label, "Administrator");
    }

    #[test]
    fn test_scope_filters() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        let member = &config.permissions.default_roles[0];
        assert!(member.applies_to("group", "club"));
        assert!(member.applies_to("node", "club"));
        assert!(!member.applies_to("group", "team"));
        assert!(config.permissions.permissions[0].applies_to("anything", "at_all"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        let rendered = config.to_toml().unwrap();
        let reparsed = Config::from_toml_str(&rendered).unwrap();

        assert_eq!(reparsed.permissions.default_roles, config.permissions.default_roles);
        assert_eq!(reparsed.registry.entity_types, config.registry.entity_types);
        assert_eq!(reparsed.registry.group_content, config.registry.group_content);
    }
}
