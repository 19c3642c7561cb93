//! DUPLEX_MISMATCH: interface duplex settings on both endpoints of a link
//! must agree when both are explicit.

use crate::graph::TopologyGraph;
use crate::registry::{finding, Check};
use netval_model::{CheckResult, Severity};

pub struct DuplexMismatch;

impl Check for DuplexMismatch {
    fn check_id(&self) -> &'static str {
        "DUPLEX_MISMATCH"
    }

    fn name(&self) -> &'static str {
        "Link duplex agreement"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn run(&self, graph: &TopologyGraph) -> Vec<CheckResult> {
        let mut results = Vec::new();

        for node_index in graph.nodes_sorted() {
            let node = graph.node(node_index);
            for edge_index in graph.edges_sorted(node_index) {
                let far_index = graph.other_endpoint(edge_index, node_index);
                let far = graph.node(far_index);
                if far.device_id < node.device_id {
                    continue;
                }

                let edge = graph.edge(edge_index);
                let Some(near_if) = edge.interface_on(&node.device_id).and_then(|n| node.interfaces.get(n)) else { continue };
                let Some(far_if) = edge.interface_on(&far.device_id).and_then(|n| far.interfaces.get(n)) else { continue };
                let (Some(near_duplex), Some(far_duplex)) = (near_if.duplex, far_if.duplex) else { continue };

                let passed = near_duplex == far_duplex;
                results.push(finding(
                    self,
                    passed,
                    Some(node.device_id.clone()),
                    Some(near_if.name.clone()),
                    if passed {
                        format!("duplex agrees ({near_duplex:?}) on link {}-{}", node.hostname, far.hostname)
                    } else {
                        format!(
                            "duplex mismatch on link {}-{}: {} is {near_duplex:?}, {} is {far_duplex:?}",
                            node.hostname, far.hostname, node.hostname, far.hostname
                        )
                    },
                    if passed { None } else { Some("duplex full".to_string()) },
                ));
            }
        }

        if results.is_empty() {
            results.push(finding(self, true, None, None, "no link has both endpoints' duplex explicitly set", None));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::assemble;
    use netval_model::{Device, DeviceRole, Duplex, Interface, InterfaceMode, InterfaceState, Link, LinkMedium, LinkState};
    use std::collections::{BTreeMap, BTreeSet};

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

    fn iface(device_id: &str, name: &str, duplex: Option<Duplex>) -> Interface {
        Interface {
            id: format!("{device_id}-{name}"),
            device_id: device_id.into(),
            name: name.into(),
            description: None,
            mode: InterfaceMode::Access,
            vlan_access: Some(10),
            vlan_trunk_allowed: BTreeSet::new(),
            native_vlan: None,
            ip_address: None,
            ip_mask: None,
            dhcp_helper: None,
            duplex,
            state: InterfaceState::Up,
        }
    }

    fn link(a: &str, b: &str, if_name: &str) -> Link {
        Link {
            id: "l1".into(),
            project_id: "p1".into(),
            source_device_id: a.into(),
            source_interface: if_name.into(),
            target_device_id: b.into(),
            target_interface: if_name.into(),
            medium: LinkMedium::Ethernet,
            vlan_allow_list: BTreeSet::new(),
            state: LinkState::Connected,
        }
    }

    #[test]
    fn flags_mismatched_explicit_duplex() {
        let devices = vec![device("a", "SW-A"), device("b", "SW-B")];
        let interfaces = vec![iface("a", "Gi1", Some(Duplex::Full)), iface("b", "Gi1", Some(Duplex::Half))];
        let links = vec![link("a", "b", "Gi1")];
        let graph = assemble(&devices, &interfaces, &[], &links, &BTreeMap::new());
        let results = DuplexMismatch.run(&graph);
        assert!(results.iter().any(|r| !r.passed));
    }

    #[test]
    fn silent_when_duplex_unset_on_either_side() {
        let devices = vec![device("a", "SW-A"), device("b", "SW-B")];
        let interfaces = vec![iface("a", "Gi1", Some(Duplex::Full)), iface("b", "Gi1", None)];
        let links = vec![link("a", "b", "Gi1")];
        let graph = assemble(&devices, &interfaces, &[], &links, &BTreeMap::new());
        let results = DuplexMismatch.run(&graph);
        assert!(results.iter().all(|r| r.passed));
    }
}
