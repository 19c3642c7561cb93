//! Persistence layer for the NetVal topology store: one embedded libSQL
//! database per installation, a repository per domain entity, and cascading
//! delete semantics enforced by `ON DELETE CASCADE` foreign keys.

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::StoreClient;
pub use errors::DbError;
pub use repositories::{
    AuditRepository, DeviceRepository, DeviceVlanRepository, InterfaceRepository, JobRepository,
    LinkRepository, PlanRepository, ProjectRepository, SnapshotRepository,
};
