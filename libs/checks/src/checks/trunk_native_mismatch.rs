//! TRUNK_NATIVE_MISMATCH: native VLANs on both endpoints of a trunk must
//! match. Silent when either side has not set a native VLAN explicitly.

use crate::graph::TopologyGraph;
use crate::registry::{finding, Check};
use netval_model::{CheckResult, InterfaceMode, Severity};

pub struct TrunkNativeMismatch;

impl Check for TrunkNativeMismatch {
    fn check_id(&self) -> &'static str {
        "TRUNK_NATIVE_MISMATCH"
    }

    fn name(&self) -> &'static str {
        "Trunk native VLAN agreement"
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

                if near_if.mode != InterfaceMode::Trunk || far_if.mode != InterfaceMode::Trunk {
                    continue;
                }

                let (Some(near_native), Some(far_native)) = (near_if.native_vlan, far_if.native_vlan) else { continue };
                let passed = near_native == far_native;
                results.push(finding(
                    self,
                    passed,
                    Some(node.device_id.clone()),
                    Some(near_if.name.clone()),
                    if passed {
                        format!("native VLAN {near_native} agrees on trunk {}-{}", node.hostname, far.hostname)
                    } else {
                        format!(
                            "native VLAN mismatch on trunk {}-{}: {} has {near_native}, {} has {far_native}",
                            node.hostname, far.hostname, node.hostname, far.hostname
                        )
                    },
                    if passed { None } else { Some(format!("switchport trunk native vlan {far_native}")) },
                ));
            }
        }

        if results.is_empty() {
            results.push(finding(self, true, None, None, "no trunk pair has both native VLANs set", None));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::assemble;
    use netval_model::{Device, DeviceRole, Interface, InterfaceState, Link, LinkMedium, LinkState};
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

    fn trunk_if(device_id: &str, name: &str, native: Option<u16>) -> Interface {
        Interface {
            id: format!("{device_id}-{name}"),
            device_id: device_id.into(),
            name: name.into(),
            description: None,
            mode: InterfaceMode::Trunk,
            vlan_access: None,
            vlan_trunk_allowed: BTreeSet::new(),
            native_vlan: native,
            ip_address: None,
            ip_mask: None,
            dhcp_helper: None,
            duplex: None,
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
    fn flags_mismatched_native_vlans() {
        let devices = vec![device("a", "SW-A"), device("b", "SW-B")];
        let interfaces = vec![trunk_if("a", "Gi1", Some(1)), trunk_if("b", "Gi1", Some(99))];
        let links = vec![link("a", "b", "Gi1")];
        let graph = assemble(&devices, &interfaces, &[], &links, &BTreeMap::new());
        let results = TrunkNativeMismatch.run(&graph);
        assert!(results.iter().any(|r| !r.passed));
    }

    #[test]
    fn silent_when_native_vlan_unset_on_either_side() {
        let devices = vec![device("a", "SW-A"), device("b", "SW-B")];
        let interfaces = vec![trunk_if("a", "Gi1", Some(1)), trunk_if("b", "Gi1", None)];
        let links = vec![link("a", "b", "Gi1")];
        let graph = assemble(&devices, &interfaces, &[], &links, &BTreeMap::new());
        let results = TrunkNativeMismatch.run(&graph);
        assert!(results.iter().all(|r| r.passed));
    }
}
