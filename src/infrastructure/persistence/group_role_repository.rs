//! PostgreSQL group role repository

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::group_role::{GroupRole, GroupRoleRecord, GroupRoleRepository};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;

const COLUMNS: &str =
    "id, name, label, group_type, group_bundle, group_id, is_admin, weight, permissions";

#[derive(Debug, Clone, sqlx::FromRow)]
struct GroupRoleRow {
    id: String,
    name: String,
    label: String,
    group_type: String,
    group_bundle: String,
    group_id: Option<String>,
    is_admin: bool,
    weight: i32,
    permissions: Vec<String>,
}

impl TryFrom<GroupRoleRow> for GroupRole {
    type Error = DomainError;

    fn try_from(row: GroupRoleRow) -> Result<Self> {
        GroupRole::try_from(GroupRoleRecord {
            id: row.id,
            name: row.name,
            label: row.label,
            group_type: row.group_type,
            group_bundle: row.group_bundle,
            group_id: row.group_id,
            is_admin: row.is_admin,
            weight: row.weight,
            permissions: row.permissions,
        })
    }
}

fn database_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::Internal(format!("{}: {}", context, err))
}

pub struct PgGroupRoleRepository {
    pool: PgPool,
}

impl PgGroupRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRoleRepository for PgGroupRoleRepository {
    async fn get(&self, id: &str) -> Result<Option<GroupRole>> {
        let row = sqlx::query_as::<_, GroupRoleRow>(&format!(
            "SELECT {} FROM group_roles WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to get group role", e))?;

        row.map(GroupRole::try_from).transpose()
    }

    async fn insert(&self, role: &GroupRole) -> Result<()> {
        let record = GroupRoleRecord::from(role.clone());

        // The primary key makes the existence check and the insert atomic
        sqlx::query(
            r#"
            INSERT INTO group_roles
                (id, name, label, group_type, group_bundle, group_id, is_admin, weight, permissions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.label)
        .bind(&record.group_type)
        .bind(&record.group_bundle)
        .bind(&record.group_id)
        .bind(record.is_admin)
        .bind(record.weight)
        .bind(&record.permissions)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::StorageConflict(
                format!("group role '{}' already exists", record.id),
            ),
            _ => database_error("Failed to insert group role", e),
        })?;

        Ok(())
    }

    async fn update(&self, role: &GroupRole) -> Result<()> {
        let record = GroupRoleRecord::from(role.clone());

        let result = sqlx::query(
            r#"
            UPDATE group_roles
            SET label = $2, is_admin = $3, weight = $4, permissions = $5
            WHERE id = $1
            "#,
        )
        .bind(&record.id)
        .bind(&record.label)
        .bind(record.is_admin)
        .bind(record.weight)
        .bind(&record.permissions)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to update group role", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("group role '{}'", record.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM group_roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Failed to delete group role", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_scope(
        &self,
        group_type: &str,
        group_bundle: &str,
        group_id: Option<String>,
    ) -> Result<Vec<GroupRole>> {
        let rows = sqlx::query_as::<_, GroupRoleRow>(&format!(
            r#"
            SELECT {}
            FROM group_roles
            WHERE group_type = $1
              AND group_bundle = $2
              AND group_id IS NOT DISTINCT FROM $3
            ORDER BY weight ASC, id ASC
            "#,
            COLUMNS
        ))
        .bind(group_type)
        .bind(group_bundle)
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list group roles", e))?;

        rows.into_iter().map(GroupRole::try_from).collect()
    }
}
