//! Group role repository interface

use super::entity::GroupRole;
use crate::domain::shared::result::Result;
use async_trait::async_trait;

/// Storage port for group roles, keyed by the derived role id.
///
/// `insert` must check and insert atomically: two concurrent inserts of the
/// same id end in one success and one `StorageConflict`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRoleRepository: Send + Sync {
    /// Find role by id
    async fn get(&self, id: &str) -> Result<Option<GroupRole>>;

    /// Store a new role; fails with `StorageConflict` if the id is taken
    async fn insert(&self, role: &GroupRole) -> Result<()>;

    /// Replace an existing role; fails with `NotFound` if the id is unknown
    async fn update(&self, role: &GroupRole) -> Result<()>;

    /// Delete role by id, returning whether it existed
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Roles of one scope, ordered by weight then id.
    ///
    /// `group_id` of `None` lists the roles shared by every group of the
    /// type/bundle; `Some` lists the roles of that single group.
    async fn list_by_scope(
        &self,
        group_type: &str,
        group_bundle: &str,
        group_id: Option<String>,
    ) -> Result<Vec<GroupRole>>;
}
