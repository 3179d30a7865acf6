//! Configuration-backed content registry
//!
//! Answers which content bundles are installed on a group bundle and what the
//! entity types and bundles are called, from the `[registry]` config section.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::RegistryConfig;
use crate::domain::permission::{BundleMetadata, GroupContentBundleIds, GroupContentIndex};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::ContentBundle;

#[derive(Debug, Clone)]
struct EntityTypeLabels {
    plural_label: String,
    bundles: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfiguredRegistry {
    entity_types: BTreeMap<String, EntityTypeLabels>,
    group_content: BTreeMap<(String, String), GroupContentBundleIds>,
    installed: BTreeSet<ContentBundle>,
}

impl ConfiguredRegistry {
    /// Build the registry, rejecting group content on undeclared bundles
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut registry = Self::default();

        for entity_type in &config.entity_types {
            if entity_type.id.is_empty() {
                return Err(DomainError::ConfigurationInvalid(
                    "entity types require an id".to_string(),
                ));
            }
            let plural_label = if entity_type.plural_label.is_empty() {
                entity_type.label.clone()
            } else {
                entity_type.plural_label.clone()
            };
            registry.entity_types.insert(
                entity_type.id.clone(),
                EntityTypeLabels {
                    plural_label,
                    bundles: entity_type.bundles.clone(),
                },
            );
        }

        for relation in &config.group_content {
            let content = ContentBundle::new(relation.entity_type.as_str(), relation.bundle.as_str());
            let known = registry
                .entity_types
                .get(&content.entity_type)
                .map_or(false, |labels| labels.bundles.contains_key(&content.bundle));
            if !known {
                return Err(DomainError::ConfigurationInvalid(format!(
                    "group content {} on {}:{} refers to an unknown bundle",
                    content, relation.group_type, relation.group_bundle
                )));
            }

            registry
                .group_content
                .entry((relation.group_type.clone(), relation.group_bundle.clone()))
                .or_default()
                .entry(relation.entity_type.clone())
                .or_default()
                .insert(relation.bundle.clone());
            registry.installed.insert(content);
        }

        debug!(
            entity_types = registry.entity_types.len(),
            group_bundles = registry.group_content.len(),
            "Content registry built"
        );
        Ok(registry)
    }
}

impl GroupContentIndex for ConfiguredRegistry {
    fn group_content_bundle_ids_by_group_bundle(
        &self,
        group_type: &str,
        group_bundle: &str,
    ) -> Result<GroupContentBundleIds> {
        Ok(self
            .group_content
            .get(&(group_type.to_string(), group_bundle.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn is_group_content(&self, entity_type: &str, bundle: &str) -> bool {
        self.installed
            .contains(&ContentBundle::new(entity_type, bundle))
    }
}

impl BundleMetadata for ConfiguredRegistry {
    fn bundle_label(&self, entity_type: &str, bundle: &str) -> Result<String> {
        self.entity_types
            .get(entity_type)
            .and_then(|labels| labels.bundles.get(bundle))
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("bundle {}:{}", entity_type, bundle)))
    }

    fn plural_label(&self, entity_type: &str) -> Result<String> {
        self.entity_types
            .get(entity_type)
            .map(|labels| labels.plural_label.clone())
            .ok_or_else(|| DomainError::NotFound(format!("entity type {}", entity_type)))
    }
}
