//! Repository-per-entity persistence adapters.

pub mod audit_repository;
pub mod device_repository;
pub mod interface_repository;
pub mod link_repository;
pub mod job_repository;
pub mod plan_repository;
pub mod project_repository;
pub mod snapshot_repository;
pub mod vlan_repository;

pub use audit_repository::AuditRepository;
pub use device_repository::DeviceRepository;
pub use interface_repository::InterfaceRepository;
pub use job_repository::JobRepository;
pub use link_repository::LinkRepository;
pub use plan_repository::PlanRepository;
pub use project_repository::ProjectRepository;
pub use snapshot_repository::SnapshotRepository;
pub use vlan_repository::DeviceVlanRepository;
