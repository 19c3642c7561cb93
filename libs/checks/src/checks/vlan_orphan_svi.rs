//! VLAN_ORPHAN_SVI: for every interface named `Vlan<N>` with an IP, VLAN N
//! must be present in the owning device's VLAN database.

use crate::graph::TopologyGraph;
use crate::registry::{finding, Check};
use netval_model::{CheckResult, Severity};

pub struct VlanOrphanSvi;

impl Check for VlanOrphanSvi {
    fn check_id(&self) -> &'static str {
        "VLAN_ORPHAN_SVI"
    }

    fn name(&self) -> &'static str {
        "SVI anchored on a VLAN present in the device's database"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn run(&self, graph: &TopologyGraph) -> Vec<CheckResult> {
        let mut results = Vec::new();

        for node_index in graph.nodes_sorted() {
            let node = graph.node(node_index);
            for interface in node.interfaces.values() {
                if !interface.is_svi() {
                    continue;
                }
                let Some(vlan_id) = interface.svi_vlan_id() else {
                    continue;
                };
                let passed = node.vlans.contains(&vlan_id);
                results.push(finding(
                    self,
                    passed,
                    Some(node.device_id.clone()),
                    Some(interface.name.clone()),
                    if passed {
                        format!("{} is anchored on VLAN {vlan_id}, present in {}'s VLAN database", interface.name, node.hostname)
                    } else {
                        format!("{} on {} has no matching VLAN {vlan_id} in the device's VLAN database", interface.name, node.hostname)
                    },
                    if passed { None } else { Some(format!("vlan {vlan_id}\n name VLAN{vlan_id}")) },
                ));
            }
        }

        if results.is_empty() {
            results.push(finding(self, true, None, None, "no SVIs in this topology", None));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::assemble;
    use netval_model::{Device, DeviceRole, Interface, InterfaceMode, InterfaceState};
    use std::collections::{BTreeMap, BTreeSet};

    fn device(id: &str) -> Device {
        Device {
            id: id.into(),
            project_id: "p1".into(),
            hostname: "SW-A".into(),
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

    fn svi(device_id: &str, vlan: u16, has_ip: bool) -> Interface {
        Interface {
            id: format!("svi{vlan}"),
            device_id: device_id.into(),
            name: format!("Vlan{vlan}"),
            description: None,
            mode: InterfaceMode::Routed,
            vlan_access: None,
            vlan_trunk_allowed: BTreeSet::new(),
            native_vlan: None,
            ip_address: has_ip.then(|| "10.0.10.1".to_string()),
            ip_mask: has_ip.then(|| "255.255.255.0".to_string()),
            dhcp_helper: None,
            duplex: None,
            state: InterfaceState::Up,
        }
    }

    #[test]
    fn fails_when_svi_vlan_missing_from_database() {
        let devices = vec![device("a")];
        let interfaces = vec![svi("a", 10, true)];
        let graph = assemble(&devices, &interfaces, &[], &[], &BTreeMap::new());
        let results = VlanOrphanSvi.run(&graph);
        assert!(results.iter().any(|r| !r.passed && r.interface.as_deref() == Some("Vlan10")));
    }

    #[test]
    fn ignores_vlan_interfaces_without_an_ip() {
        let devices = vec![device("a")];
        let interfaces = vec![svi("a", 10, false)];
        let graph = assemble(&devices, &interfaces, &[], &[], &BTreeMap::new());
        let results = VlanOrphanSvi.run(&graph);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn passes_when_vlan_present_in_database() {
        use netval_model::DeviceVlan;
        let devices = vec![device("a")];
        let interfaces = vec![svi("a", 10, true)];
        let vlans = vec![DeviceVlan { device_id: "a".into(), vlan_id: 10, name: "DATA".into() }];
        let graph = assemble(&devices, &interfaces, &vlans, &[], &BTreeMap::new());
        let results = VlanOrphanSvi.run(&graph);
        assert!(results.iter().all(|r| r.passed));
    }
}
