//! The check abstraction: a sum type over a fixed registry rather than open
//! subclassing. Each check is a named, pure `run(graph) -> Vec<CheckResult>`
//! function; adding a check is additive to the registry and does not disturb
//! the deterministic ordering the engine relies on.

use crate::graph::TopologyGraph;
use netval_model::{CheckResult, Severity};

/// A single registered validation check.
pub trait Check: Send + Sync {
    /// Stable identifier, used as `CheckResult::check_id` and in remediation
    /// templates — never change an existing check's id.
    fn check_id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn default_severity(&self) -> Severity;
    fn run(&self, graph: &TopologyGraph) -> Vec<CheckResult>;
}

/// Builds a passing/failing finding for `check` with default severity,
/// cutting down on boilerplate in every check implementation below.
pub fn finding(
    check: &dyn Check,
    passed: bool,
    device_id: Option<String>,
    interface: Option<String>,
    detail: impl Into<String>,
    suggested_fix: Option<String>,
) -> CheckResult {
    finding_with_severity(check, check.default_severity(), passed, device_id, interface, detail, suggested_fix)
}

/// Like [`finding`], but for the rare case where a single check emits
/// findings at more than one severity (e.g. an informational pass finding
/// from a check whose failures are errors).
#[allow(clippy::too_many_arguments)]
pub fn finding_with_severity(
    check: &dyn Check,
    severity: Severity,
    passed: bool,
    device_id: Option<String>,
    interface: Option<String>,
    detail: impl Into<String>,
    suggested_fix: Option<String>,
) -> CheckResult {
    CheckResult {
        check_id: check.check_id().to_string(),
        severity,
        passed,
        device_id,
        interface,
        detail: detail.into(),
        suggested_fix,
    }
}

/// The registry's fixed run order. Check order is part of the determinism
/// contract, so registering a new check means appending to this list, never
/// reordering the existing entries.
pub fn default_registry() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(crate::checks::vlan_continuity::VlanContinuity),
        Box::new(crate::checks::vlan_orphan_svi::VlanOrphanSvi),
        Box::new(crate::checks::wlc_join_chain::WlcJoinChain),
        Box::new(crate::checks::trunk_native_mismatch::TrunkNativeMismatch),
        Box::new(crate::checks::mgmt_ssh_path::MgmtSshPath),
        Box::new(crate::checks::routing_blackhole::RoutingBlackhole),
        Box::new(crate::checks::dhcp_reachability::DhcpReachability),
        Box::new(crate::checks::duplex_mismatch::DuplexMismatch),
    ]
}
