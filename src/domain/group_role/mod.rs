//! Group role domain

pub mod entity;
pub mod event;
pub mod identifier;
pub mod repository;

pub use entity::{GroupRole, GroupRoleBuilder, GroupRoleRecord, GroupRoleValues, ADMINISTRATOR_ROLE};
pub use event::GroupRoleEvent;
pub use identifier::{derive_role_id, role_id_prefix, role_name_from_id};
pub use repository::GroupRoleRepository;
