//! PostgreSQL group role repository integration tests
#![cfg(feature = "postgres")]

use sqlx::PgPool;
use grouprole::domain::group_role::{GroupRole, GroupRoleRepository};
use grouprole::infrastructure::persistence::{create_pool, run_migrations, DatabaseConfig, PgGroupRoleRepository};

fn role(name: &str, group_id: Option<&str>) -> GroupRole {
    let mut builder = GroupRole::create();
    builder
        .set_name(name)
        .set_group_type("repo_test")
        .set_group_bundle("group")
        .grant_permissions(["view group", "leave group"]);
    if let Some(group_id) = group_id {
        builder.set_group_id(group_id);
    }
    builder.prepare().expect("Invalid test role")
}

#[tokio::test]
#[ignore] // Requires database
async fn test_insert_and_get() {
    let pool = setup_database().await;
    let repo = PgGroupRoleRepository::new(pool.clone());

    let member = role("member", None);
    repo.insert(&member).await.expect("Failed to insert role");

    let loaded = repo
        .get("repo_test-group-member")
        .await
        .expect("Failed to get role")
        .expect("Role not found");
    assert_eq!(loaded, member);

    cleanup_database(pool).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_duplicate_insert_conflicts() {
    let pool = setup_database().await;
    let repo = PgGroupRoleRepository::new(pool.clone());

    repo.insert(&role("editor", None)).await.expect("Failed to insert role");
    let err = repo.insert(&role("editor", None)).await.unwrap_err();
    assert!(err.is_conflict());

    cleanup_database(pool).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_update_and_list_by_scope() {
    let pool = setup_database().await;
    let repo = PgGroupRoleRepository::new(pool.clone());

    let shared = role("reviewer", None);
    repo.insert(&shared).await.expect("Failed to insert role");
    repo.insert(&role("reviewer", Some("9"))).await.expect("Failed to insert role");

    let mut draft = shared.to_builder();
    draft.revoke_permission("leave group").set_weight(4);
    let updated = draft.prepare().unwrap();
    repo.update(&updated).await.expect("Failed to update role");

    let listed = repo
        .list_by_scope("repo_test", "group", None)
        .await
        .expect("Failed to list roles");
    let reviewer = listed
        .iter()
        .find(|r| r.id() == "repo_test-group-reviewer")
        .expect("Reviewer missing");
    assert_eq!(reviewer.weight(), 4);
    assert!(!reviewer.has_permission("leave group"));
    assert!(listed.iter().all(|r| r.group_id().is_none()));

    let instance = repo
        .list_by_scope("repo_test", "group", Some("9".to_string()))
        .await
        .expect("Failed to list roles");
    assert_eq!(instance.len(), 1);

    cleanup_database(pool).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_update_and_delete_missing() {
    let pool = setup_database().await;
    let repo = PgGroupRoleRepository::new(pool.clone());

    let err = repo.update(&role("ghost", None)).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!repo.delete("repo_test-group-ghost").await.unwrap());

    cleanup_database(pool).await;
}

async fn setup_database() -> PgPool {
    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/grouprole_test".to_string());

    let pool = create_pool(&DatabaseConfig::with_url(db_url))
        .await
        .expect("Failed to create pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    cleanup(&pool).await;
    pool
}

async fn cleanup(pool: &PgPool) {
    sqlx::query("DELETE FROM group_roles WHERE group_type = 'repo_test'")
        .execute(pool)
        .await
        .ok();
}

async fn cleanup_database(pool: PgPool) {
    cleanup(&pool).await;
    pool.close().await;
}
