//! The check scheduler: `assemble(project) -> graph; for each registered
//! check: check.run(graph) -> findings; aggregate(findings, graph) ->
//! AuditResult`.
//!
//! Checks are synchronous CPU code over an immutable graph; no check body
//! suspends, so this module stays synchronous end to end. The server
//! dispatches `run_registry` inside `spawn_blocking` and wraps it with a
//! `tokio::time::timeout` for the per-check budget, since a pure function
//! cannot abort itself mid-computation.

use crate::graph::TopologyGraph;
use crate::registry::Check;
use netval_model::{AuditResult, CheckResult, ReachabilityMatrix, Severity};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// A progress event emitted between checks, mirrored to WebSocket
/// subscribers as `check_start`/`check_complete`.
#[derive(Debug, Clone)]
pub enum CheckEvent {
    Start { check_id: &'static str },
    Complete { check_id: &'static str, passed_count: usize, failed_count: usize },
}

/// Default per-check wall-clock budget before a check is considered to have
/// overrun.
pub const DEFAULT_CHECK_BUDGET: Duration = Duration::from_secs(5);

/// Runs every check in `registry`, in registry order, against `graph`,
/// calling `on_event` between checks. A check that panics or exceeds
/// `budget` is reported as a single `severity=error` finding with
/// `check_id = "<id>_INTERNAL"` and the remaining checks still run.
pub fn run_registry(graph: &TopologyGraph, registry: &[Box<dyn Check>], budget: Duration, mut on_event: impl FnMut(CheckEvent)) -> Vec<CheckResult> {
    let mut findings = Vec::new();

    for check in registry {
        on_event(CheckEvent::Start { check_id: check.check_id() });

        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| check.run(graph)));
        let elapsed = started.elapsed();

        let results = match outcome {
            Ok(results) if elapsed <= budget => results,
            Ok(_) => vec![internal_failure(check.check_id(), format!("check exceeded its {budget:?} budget (ran {elapsed:?})"))],
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "check panicked with a non-string payload".to_string());
                vec![internal_failure(check.check_id(), message)]
            }
        };

        let passed_count = results.iter().filter(|r| r.passed).count();
        let failed_count = results.len() - passed_count;
        on_event(CheckEvent::Complete { check_id: check.check_id(), passed_count, failed_count });

        findings.extend(results);
    }

    findings
}

fn internal_failure(check_id: &str, message: String) -> CheckResult {
    CheckResult {
        check_id: format!("{check_id}_INTERNAL"),
        severity: Severity::Error,
        passed: false,
        device_id: None,
        interface: None,
        detail: message,
        suggested_fix: None,
    }
}

/// Dense reachability matrix over every ordered pair of devices:
/// `M[src.hostname][dst.hostname]`.
pub fn reachability_matrix(graph: &TopologyGraph) -> ReachabilityMatrix {
    let mut matrix = ReachabilityMatrix::default();
    let nodes = graph.nodes_sorted();

    for &src in &nodes {
        let reachable = bfs_reachable_set(graph, src);
        let src_hostname = graph.node(src).hostname.clone();
        for &dst in &nodes {
            if src == dst {
                continue;
            }
            let dst_hostname = graph.node(dst).hostname.clone();
            matrix.set(&src_hostname, &dst_hostname, reachable.contains(&dst));
        }
    }
    matrix
}

fn bfs_reachable_set(graph: &TopologyGraph, start: petgraph::graph::NodeIndex) -> std::collections::HashSet<petgraph::graph::NodeIndex> {
    use std::collections::{HashSet, VecDeque};
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);
    while let Some(current) = queue.pop_front() {
        for edge in graph.edges_sorted(current) {
            let neighbor = graph.other_endpoint(edge, current);
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    visited.remove(&start);
    visited
}

/// Builds the fully self-describing [`AuditResult`]: every field a renderer
/// needs is present without re-reading the topology.
pub fn aggregate(project_id: String, findings: Vec<CheckResult>, reachability: ReachabilityMatrix, generated_at: chrono::DateTime<chrono::Utc>) -> AuditResult {
    AuditResult { project_id, findings, reachability, generated_at }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::assemble;
    use crate::registry::default_registry;
    use netval_model::{Device, DeviceRole};
    use std::collections::BTreeMap;

    fn device(id: &str, hostname: &str) -> Device {
        Device {
            id: id.into(),
            project_id: "p1".into(),
            hostname: hostname.into(),
            role: DeviceRole::Switch,
            vendor: "Cisco".into(),
            platform: "IOS-XE".into(),
            management_ip: None,
            canvas_x: 0.0,
            canvas_y: 0.0,
            credential_ref: None,
            config_hash: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn running_the_full_registry_twice_is_deterministic() {
        let devices = vec![device("a", "SW-A"), device("b", "SW-B")];
        let graph = assemble(&devices, &[], &[], &[], &BTreeMap::new());
        let registry = default_registry();

        let first = run_registry(&graph, &registry, DEFAULT_CHECK_BUDGET, |_| {});
        let second = run_registry(&graph, &registry, DEFAULT_CHECK_BUDGET, |_| {});

        assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
    }

    #[test]
    fn emits_start_and_complete_events_per_check() {
        let devices = vec![device("a", "SW-A")];
        let graph = assemble(&devices, &[], &[], &[], &BTreeMap::new());
        let registry = default_registry();
        let mut events = Vec::new();
        run_registry(&graph, &registry, DEFAULT_CHECK_BUDGET, |event| events.push(event));

        let starts = events.iter().filter(|e| matches!(e, CheckEvent::Start { .. })).count();
        assert_eq!(starts, registry.len());
    }

    #[test]
    fn reachability_matrix_reflects_connected_pairs() {
        use netval_model::{Link, LinkMedium, LinkState};
        let devices = vec![device("a", "SW-A"), device("b", "SW-B"), device("c", "SW-C")];
        let links = vec![Link {
            id: "l1".into(),
            project_id: "p1".into(),
            source_device_id: "a".into(),
            source_interface: "Gi1".into(),
            target_device_id: "b".into(),
            target_interface: "Gi1".into(),
            medium: LinkMedium::Ethernet,
            vlan_allow_list: Default::default(),
            state: LinkState::Connected,
        }];
        let graph = assemble(&devices, &[], &[], &links, &BTreeMap::new());
        let matrix = reachability_matrix(&graph);
        assert_eq!(matrix.get("SW-A", "SW-B"), Some(true));
        assert_eq!(matrix.get("SW-A", "SW-C"), Some(false));
    }
}
