//! Domain types shared by every NetVal crate: the persisted topology entities,
//! the parsed device sub-model the config parser produces and the CLI
//! renderer consumes, and the audit/plan artifacts the validation and
//! remediation engines produce.

pub mod audit;
pub mod config_model;
pub mod device;
pub mod interface;
pub mod job;
pub mod link;
pub mod plan;
pub mod project;
pub mod snapshot;
pub mod vlan;

pub use audit::{AuditLogEntry, AuditResult, CheckResult, ReachabilityMatrix, Severity};
pub use config_model::{AclStanza, ParsedDevice, ParsedInterface, ParsedVlan, ParseWarning, RoutingProtocol, StaticRoute};
pub use device::{Device, DeviceRole};
pub use interface::{Duplex, Interface, InterfaceMode, InterfaceState};
pub use job::{JobKind, JobStatus, SimulationJob};
pub use link::{Link, LinkMedium, LinkState};
pub use plan::{PlanStatus, RemediationItem, RemediationPlan};
pub use project::Project;
pub use snapshot::{ConfigSnapshot, SnapshotSource};
pub use vlan::DeviceVlan;

/// Content-hash used for `Device::config_hash` and `ConfigSnapshot::config_hash`:
/// SHA-256 over the raw bytes, hex-encoded, so it is directly comparable and
/// storable as TEXT.
pub fn content_hash(raw: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(digest)
}
