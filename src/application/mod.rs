//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases.
//! It's responsible for:
//! - Coordinating the permission resolver and the role repository
//! - Collecting domain events of a use case

pub mod provisioning;

pub use provisioning::{GroupProvisioningService, ProvisioningReport};
