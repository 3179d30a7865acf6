//! Persistence implementations

pub mod memory;
#[cfg(feature = "postgres")]
pub mod database;
#[cfg(feature = "postgres")]
pub mod group_role_repository;

pub use memory::InMemoryGroupRoleRepository;
#[cfg(feature = "postgres")]
pub use database::{create_pool, run_migrations, DatabaseConfig};
#[cfg(feature = "postgres")]
pub use group_role_repository::PgGroupRoleRepository;
