//! WLC_JOIN_CHAIN: the wireless join chain algorithm.
//!
//! For every (AP, WLC) pair, a path must exist, and the AP's access-port
//! VLAN must be carried by every trunk hop along that path.

use crate::graph::TopologyGraph;
use crate::registry::{finding, finding_with_severity, Check};
use netval_model::{CheckResult, DeviceRole, Severity};
use petgraph::graph::{EdgeIndex, NodeIndex};
use std::collections::{HashMap, VecDeque};

pub struct WlcJoinChain;

impl Check for WlcJoinChain {
    fn check_id(&self) -> &'static str {
        "WLC_JOIN_CHAIN"
    }

    fn name(&self) -> &'static str {
        "Wireless controller join chain"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn run(&self, graph: &TopologyGraph) -> Vec<CheckResult> {
        let aps = graph.nodes_with_role(DeviceRole::Ap);
        let wlcs = graph.nodes_with_role(DeviceRole::Wlc);

        // Step 1: if either set is empty, no findings.
        if aps.is_empty() || wlcs.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();

        for &ap_index in &aps {
            let ap = graph.node(ap_index);

            // Step 2: the AP's uplink access VLAN.
            let Some(access_vlan) = uplink_access_vlan(graph, ap_index) else {
                results.push(finding(
                    self,
                    false,
                    Some(ap.device_id.clone()),
                    None,
                    format!("AP uplink has no access VLAN ({})", ap.hostname),
                    None,
                ));
                continue;
            };

            for &wlc_index in &wlcs {
                let wlc = graph.node(wlc_index);

                // Step 3: shortest path A -> W.
                let Some(path) = shortest_path(graph, ap_index, wlc_index) else {
                    results.push(finding(
                        self,
                        false,
                        Some(ap.device_id.clone()),
                        None,
                        format!("no path from {} to controller {}", ap.hostname, wlc.hostname),
                        None,
                    ));
                    continue;
                };

                // Step 4: walk the hops, verifying the allow-list at each one.
                let mut all_passed = true;
                let mut current = ap_index;
                for (hop_number, edge_index) in path.into_iter().enumerate() {
                    let next = graph.other_endpoint(edge_index, current);
                    let edge = graph.edge(edge_index);
                    if !edge.vlan_allow_list.is_empty() && !edge.vlan_allow_list.contains(&access_vlan) {
                        all_passed = false;
                        let hop_device = graph.node(next);
                        results.push(finding(
                            self,
                            false,
                            Some(hop_device.device_id.clone()),
                            edge.interface_on(&hop_device.device_id).map(str::to_string),
                            format!(
                                "AP VLAN {access_vlan} missing from trunk at hop {hop_number}, between {} and {}",
                                graph.node(current).hostname,
                                hop_device.hostname,
                            ),
                            Some(format!("switchport trunk allowed vlan add {access_vlan}")),
                        ));
                    }
                    current = next;
                }

                // Step 5: every hop passed — an informational pass finding,
                // not the check's failure severity.
                if all_passed {
                    results.push(finding_with_severity(
                        self,
                        Severity::Info,
                        true,
                        Some(ap.device_id.clone()),
                        None,
                        format!("{} can join controller {} on VLAN {access_vlan}", ap.hostname, wlc.hostname),
                        None,
                    ));
                }
            }
        }

        results
    }
}

/// The AP's single access-mode port whose link peer is a switch, and that
/// port's access VLAN.
fn uplink_access_vlan(graph: &TopologyGraph, ap_index: NodeIndex) -> Option<u16> {
    let ap = graph.node(ap_index);
    for edge_index in graph.edges_sorted(ap_index) {
        let edge = graph.edge(edge_index);
        let Some(if_name) = edge.interface_on(&ap.device_id) else { continue };
        let Some(interface) = ap.interfaces.get(if_name) else { continue };
        if interface.mode != netval_model::InterfaceMode::Access {
            continue;
        }
        let peer_index = graph.other_endpoint(edge_index, ap_index);
        if graph.node(peer_index).role != DeviceRole::Switch {
            continue;
        }
        if let Some(vlan) = interface.vlan_access {
            return Some(vlan);
        }
    }
    None
}

/// Breadth-first shortest path from `start` to `goal`, returning the edges
/// traversed in order. Ties are broken by [`TopologyGraph::edges_sorted`]'s
/// device-id lexical order, so the result is deterministic across runs.
fn shortest_path(graph: &TopologyGraph, start: NodeIndex, goal: NodeIndex) -> Option<Vec<EdgeIndex>> {
    if start == goal {
        return Some(Vec::new());
    }

    let mut visited = HashMap::new();
    let mut queue = VecDeque::new();
    visited.insert(start, None::<(NodeIndex, EdgeIndex)>);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for edge_index in graph.edges_sorted(current) {
            let next = graph.other_endpoint(edge_index, current);
            if visited.contains_key(&next) {
                continue;
            }
            visited.insert(next, Some((current, edge_index)));
            if next == goal {
                let mut edges = Vec::new();
                let mut cursor = goal;
                while let Some(Some((prev, edge))) = visited.get(&cursor) {
                    edges.push(*edge);
                    cursor = *prev;
                }
                edges.reverse();
                return Some(edges);
            }
            queue.push_back(next);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::assemble;
    use netval_model::{Device, Interface, InterfaceMode, InterfaceState, Link, LinkMedium, LinkState};
    use std::collections::{BTreeMap, BTreeSet};

    fn device(id: &str, hostname: &str, role: DeviceRole) -> Device {
        Device {
            id: id.into(),
            project_id: "p1".into(),
            hostname: hostname.into(),
            role,
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

    fn access_if(device_id: &str, vlan: u16) -> Interface {
        Interface {
            id: format!("{device_id}-up"),
            device_id: device_id.into(),
            name: "Gi0/1".into(),
            description: None,
            mode: InterfaceMode::Access,
            vlan_access: Some(vlan),
            vlan_trunk_allowed: BTreeSet::new(),
            native_vlan: None,
            ip_address: None,
            ip_mask: None,
            dhcp_helper: None,
            duplex: None,
            state: InterfaceState::Up,
        }
    }

    fn trunk_link(a: &str, b: &str, allow: &[u16]) -> Link {
        Link {
            id: format!("{a}-{b}"),
            project_id: "p1".into(),
            source_device_id: a.into(),
            source_interface: "Gi1/0/1".into(),
            target_device_id: b.into(),
            target_interface: "Gi1/0/1".into(),
            medium: LinkMedium::Ethernet,
            vlan_allow_list: allow.iter().copied().collect(),
            state: LinkState::Connected,
        }
    }

    fn access_link(a: &str, b: &str) -> Link {
        Link {
            id: format!("{a}-{b}"),
            project_id: "p1".into(),
            source_device_id: a.into(),
            source_interface: "Gi0/1".into(),
            target_device_id: b.into(),
            target_interface: "Gi0/1".into(),
            medium: LinkMedium::Ethernet,
            vlan_allow_list: BTreeSet::new(),
            state: LinkState::Connected,
        }
    }

    #[test]
    fn no_findings_when_no_aps_or_wlcs() {
        let devices = vec![device("sw", "SW-A", DeviceRole::Switch)];
        let graph = assemble(&devices, &[], &[], &[], &BTreeMap::new());
        assert!(WlcJoinChain.run(&graph).is_empty());
    }

    #[test]
    fn fails_when_uplink_has_no_access_vlan() {
        let devices = vec![device("ap", "AP-1", DeviceRole::Ap), device("w", "WLC-1", DeviceRole::Wlc)];
        let graph = assemble(&devices, &[], &[], &[], &BTreeMap::new());
        let results = WlcJoinChain.run(&graph);
        assert!(results.iter().any(|r| !r.passed && r.detail.contains("no access VLAN")));
    }

    #[test]
    fn fails_at_the_hop_missing_the_ap_vlan() {
        let devices = vec![
            device("ap", "AP-1", DeviceRole::Ap),
            device("swa", "SW-ACCESS", DeviceRole::Switch),
            device("swc", "SW-CORE", DeviceRole::Switch),
            device("w", "WLC-1", DeviceRole::Wlc),
        ];
        let interfaces = vec![access_if("ap", 20)];
        let links = vec![
            access_link("ap", "swa"),
            trunk_link("swa", "swc", &[10, 20, 30]),
            trunk_link("swc", "w", &[10, 30]), // missing 20
        ];
        let graph = assemble(&devices, &interfaces, &[], &links, &BTreeMap::new());
        let results = WlcJoinChain.run(&graph);
        let failure = results.iter().find(|r| !r.passed).expect("expected a failure");
        assert!(failure.detail.contains("VLAN 20 missing from trunk"));
        assert_eq!(failure.device_id.as_deref(), Some("w"));
        assert_eq!(failure.suggested_fix.as_deref(), Some("switchport trunk allowed vlan add 20"));
    }

    #[test]
    fn passes_when_every_hop_carries_the_ap_vlan() {
        let devices = vec![
            device("ap", "AP-1", DeviceRole::Ap),
            device("swa", "SW-ACCESS", DeviceRole::Switch),
            device("w", "WLC-1", DeviceRole::Wlc),
        ];
        let interfaces = vec![access_if("ap", 20)];
        let links = vec![access_link("ap", "swa"), trunk_link("swa", "w", &[10, 20, 30])];
        let graph = assemble(&devices, &interfaces, &[], &links, &BTreeMap::new());
        let results = WlcJoinChain.run(&graph);
        assert!(results.iter().any(|r| r.passed));
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn fails_when_no_path_exists() {
        let devices = vec![
            device("ap", "AP-1", DeviceRole::Ap),
            device("swa", "SW-ACCESS", DeviceRole::Switch),
            device("w", "WLC-1", DeviceRole::Wlc),
        ];
        let interfaces = vec![access_if("ap", 20)];
        let links = vec![access_link("ap", "swa")];
        let graph = assemble(&devices, &interfaces, &[], &links, &BTreeMap::new());
        let results = WlcJoinChain.run(&graph);
        assert!(results.iter().any(|r| !r.passed && r.detail.contains("no path")));
    }
}
