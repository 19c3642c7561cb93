//! MGMT_SSH_PATH: every device's management IP must lie on a VLAN reachable
//! from a designated management source, if one exists.
//!
//! The persisted topology model has no first-class "this is the management
//! source" flag, so a management source is identified heuristically as the
//! lexically-first `Router`-role device that itself carries a management IP
//! — the one device a real deployment would SSH through to reach the rest.
//! If no such device exists, the check has nothing to test against and
//! emits no findings.
use crate::graph::TopologyGraph;
use crate::registry::{finding, Check};
use netval_model::{CheckResult, DeviceRole, Severity};
use std::collections::VecDeque;

pub struct MgmtSshPath;

impl Check for MgmtSshPath {
    fn check_id(&self) -> &'static str {
        "MGMT_SSH_PATH"
    }

    fn name(&self) -> &'static str {
        "Management reachability from the SSH source"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn run(&self, graph: &TopologyGraph) -> Vec<CheckResult> {
        let Some(source_index) = graph
            .nodes_with_role(DeviceRole::Router)
            .into_iter()
            .find(|&index| graph.node(index).management_ip.is_some())
        else {
            return Vec::new();
        };
        let source = graph.node(source_index);

        let mut results = Vec::new();
        for node_index in graph.nodes_sorted() {
            let node = graph.node(node_index);
            if node.device_id == source.device_id || node.management_ip.is_none() {
                continue;
            }

            let reachable = bfs_reachable(graph, source_index, node_index);
            results.push(finding(
                self,
                reachable,
                Some(node.device_id.clone()),
                None,
                if reachable {
                    format!("{} is reachable from management source {}", node.hostname, source.hostname)
                } else {
                    format!("{} has no path from management source {}", node.hostname, source.hostname)
                },
                None,
            ));
        }

        if results.is_empty() {
            results.push(finding(self, true, None, None, "no other device declares a management IP", None));
        }
        results
    }
}

fn bfs_reachable(graph: &TopologyGraph, start: petgraph::graph::NodeIndex, goal: petgraph::graph::NodeIndex) -> bool {
    if start == goal {
        return true;
    }
    let mut visited = std::collections::HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for edge in graph.edges_sorted(current) {
            let neighbor = graph.other_endpoint(edge, current);
            if neighbor == goal {
                return true;
            }
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::assemble;
    use netval_model::{Device, Link, LinkMedium, LinkState};
    use std::collections::BTreeMap;
    use std::collections::BTreeSet;

    fn device(id: &str, hostname: &str, role: DeviceRole, mgmt_ip: Option<&str>) -> Device {
        Device {
            id: id.into(),
            project_id: "p1".into(),
            hostname: hostname.into(),
            role,
            vendor: "Cisco".into(),
            platform: "IOS-XE".into(),
            management_ip: mgmt_ip.map(str::to_string),
            canvas_x: 0.0,
            canvas_y: 0.0,
            credential_ref: None,
            config_hash: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn link(a: &str, b: &str) -> Link {
        Link {
            id: format!("{a}-{b}"),
            project_id: "p1".into(),
            source_device_id: a.into(),
            source_interface: "Gi1".into(),
            target_device_id: b.into(),
            target_interface: "Gi1".into(),
            medium: LinkMedium::Ethernet,
            vlan_allow_list: BTreeSet::new(),
            state: LinkState::Connected,
        }
    }

    #[test]
    fn no_findings_without_a_designated_source() {
        let devices = vec![device("a", "SW-A", DeviceRole::Switch, Some("10.0.0.2"))];
        let graph = assemble(&devices, &[], &[], &[], &BTreeMap::new());
        assert!(MgmtSshPath.run(&graph).is_empty());
    }

    #[test]
    fn fails_for_an_unreachable_device() {
        let devices = vec![
            device("r", "RTR", DeviceRole::Router, Some("10.0.0.1")),
            device("a", "SW-A", DeviceRole::Switch, Some("10.0.0.2")),
            device("b", "SW-B", DeviceRole::Switch, Some("10.0.0.3")),
        ];
        let links = vec![link("r", "a")];
        let graph = assemble(&devices, &[], &[], &links, &BTreeMap::new());
        let results = MgmtSshPath.run(&graph);
        assert!(results.iter().any(|r| !r.passed && r.device_id.as_deref() == Some("b")));
        assert!(results.iter().any(|r| r.passed && r.device_id.as_deref() == Some("a")));
    }
}
