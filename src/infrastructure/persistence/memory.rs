//! In-memory group role repository

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::group_role::{GroupRole, GroupRoleRepository};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;

/// Role store backed by a `HashMap`.
///
/// Inserts check and write under one write guard, so concurrent inserts of
/// the same id cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryGroupRoleRepository {
    roles: RwLock<HashMap<String, GroupRole>>,
}

impl InMemoryGroupRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.roles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.roles.read().await.is_empty()
    }
}

#[async_trait]
impl GroupRoleRepository for InMemoryGroupRoleRepository {
    async fn get(&self, id: &str) -> Result<Option<GroupRole>> {
        Ok(self.roles.read().await.get(id).cloned())
    }

    async fn insert(&self, role: &GroupRole) -> Result<()> {
        let mut roles = self.roles.write().await;
        match roles.entry(role.id().to_string()) {
            Entry::Occupied(_) => Err(DomainError::StorageConflict(format!(
                "group role '{}' already exists",
                role.id()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(role.clone());
                debug!(role_id = %role.id(), "Stored group role");
                Ok(())
            }
        }
    }

    async fn update(&self, role: &GroupRole) -> Result<()> {
        let mut roles = self.roles.write().await;
        match roles.get_mut(role.id()) {
            Some(existing) => {
                *existing = role.clone();
                Ok(())
            }
            None => Err(DomainError::NotFound(format!("group role '{}'", role.id()))),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.roles.write().await.remove(id).is_some())
    }

    async fn list_by_scope(
        &self,
        group_type: &str,
        group_bundle: &str,
        group_id: Option<String>,
    ) -> Result<Vec<GroupRole>> {
        let roles = self.roles.read().await;
        let mut matching: Vec<GroupRole> = roles
            .values()
            .filter(|role| {
                role.group_type() == group_type
                    && role.group_bundle() == group_bundle
                    && role.group_id() == group_id.as_deref()
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.weight().cmp(&b.weight()).then_with(|| a.id().cmp(b.id())));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn role(name: &str, group_id: Option<&str>, weight: i32) -> GroupRole {
        let mut builder = GroupRole::create();
        builder
            .set_name(name)
            .set_group_type("entity_test")
            .set_group_bundle("group")
            .set_weight(weight);
        if let Some(group_id) = group_id {
            builder.set_group_id(group_id);
        }
        builder.prepare().unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryGroupRoleRepository::new();
        let member = role("member", None, 0);

        repo.insert(&member).await.unwrap();
        let loaded = repo.get("entity_test-group-member").await.unwrap();
        assert_eq!(loaded, Some(member));
        assert!(repo.get("entity_test-group-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts_without_overwriting() {
        let repo = InMemoryGroupRoleRepository::new();
        repo.insert(&role("member", None, 0)).await.unwrap();

        let err = repo.insert(&role("member", None, 5)).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.get("entity_test-group-member").await.unwrap().unwrap().weight(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_of_one_id() {
        let repo = Arc::new(InMemoryGroupRoleRepository::new());
        let handles: Vec<_> = (0..8)
            .map(|weight| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.insert(&role("member", None, weight)).await })
            })
            .collect();

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => successes += 1,
                Err(err) if err.is_conflict() => conflicts += 1,
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_requires_existing_role() {
        let repo = InMemoryGroupRoleRepository::new();
        let err = repo.update(&role("member", None, 0)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_by_scope() {
        let repo = InMemoryGroupRoleRepository::new();
        repo.insert(&role("member", None, 5)).await.unwrap();
        repo.insert(&role("administrator", None, 5)).await.unwrap();
        repo.insert(&role("outsider", None, -1)).await.unwrap();
        repo.insert(&role("member", Some("3"), 0)).await.unwrap();

        let shared = repo
            .list_by_scope("entity_test", "group", None)
            .await
            .unwrap();
        let ids: Vec<_> = shared.iter().map(GroupRole::id).collect();
        assert_eq!(
            ids,
            vec![
                "entity_test-group-outsider",
                "entity_test-group-administrator",
                "entity_test-group-member",
            ]
        );

        let instance = repo
            .list_by_scope("entity_test", "group", Some("3".to_string()))
            .await
            .unwrap();
        assert_eq!(instance.len(), 1);
        assert_eq!(instance[0].id(), "entity_test-group-3-member");
    }

    #[test]
    fn test_delete() {
        tokio_test::block_on(async {
            let repo = InMemoryGroupRoleRepository::new();
            repo.insert(&role("member", None, 0)).await.unwrap();

            assert!(repo.delete("entity_test-group-member").await.unwrap());
            assert!(!repo.delete("entity_test-group-member").await.unwrap());
            assert!(repo.is_empty().await);
        });
    }
}
