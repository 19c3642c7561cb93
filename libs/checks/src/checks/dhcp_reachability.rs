//! DHCP_REACHABILITY (warning only): for each access-VLAN SVI, a DHCP server
//! declaration (`ip helper-address`) must be reachable — its target address
//! must resolve on some interface elsewhere in the topology.

use crate::graph::TopologyGraph;
use crate::net::in_subnet;
use crate::registry::{finding, Check};
use netval_model::{CheckResult, Severity};

pub struct DhcpReachability;

impl Check for DhcpReachability {
    fn check_id(&self) -> &'static str {
        "DHCP_REACHABILITY"
    }

    fn name(&self) -> &'static str {
        "DHCP relay target reachability"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn run(&self, graph: &TopologyGraph) -> Vec<CheckResult> {
        let mut results = Vec::new();

        let all_interfaces: Vec<_> = graph
            .nodes_sorted()
            .into_iter()
            .flat_map(|index| graph.node(index).interfaces.values().cloned().collect::<Vec<_>>())
            .collect();

        for node_index in graph.nodes_sorted() {
            let node = graph.node(node_index);
            for interface in node.interfaces.values() {
                if !interface.is_svi() {
                    continue;
                }

                let Some(helper) = &interface.dhcp_helper else {
                    results.push(finding(
                        self,
                        false,
                        Some(node.device_id.clone()),
                        Some(interface.name.clone()),
                        format!("{} on {} has no DHCP server declared", interface.name, node.hostname),
                        Some(format!("interface {}\n ip helper-address <dhcp-server-ip>", interface.name)),
                    ));
                    continue;
                };

                let reachable = all_interfaces
                    .iter()
                    .any(|other| in_subnet(helper, other.ip_address.as_deref().unwrap_or(""), other.ip_mask.as_deref().unwrap_or("")));

                results.push(finding(
                    self,
                    reachable,
                    Some(node.device_id.clone()),
                    Some(interface.name.clone()),
                    if reachable {
                        format!("DHCP relay target {helper} for {} is reachable within the topology", interface.name)
                    } else {
                        format!("DHCP relay target {helper} for {} on {} is not reachable within the topology", interface.name, node.hostname)
                    },
                    None,
                ));
            }
        }

        if results.is_empty() {
            results.push(finding(self, true, None, None, "no access-VLAN SVIs in this topology", None));
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

    fn svi(helper: Option<&str>) -> Interface {
        Interface {
            id: "svi10".into(),
            device_id: "a".into(),
            name: "Vlan10".into(),
            description: None,
            mode: InterfaceMode::Routed,
            vlan_access: None,
            vlan_trunk_allowed: BTreeSet::new(),
            native_vlan: None,
            ip_address: Some("10.0.10.1".into()),
            ip_mask: Some("255.255.255.0".into()),
            dhcp_helper: helper.map(str::to_string),
            duplex: None,
            state: InterfaceState::Up,
        }
    }

    #[test]
    fn warns_when_no_dhcp_helper_declared() {
        let devices = vec![device("a")];
        let interfaces = vec![svi(None)];
        let graph = assemble(&devices, &interfaces, &[], &[], &BTreeMap::new());
        let results = DhcpReachability.run(&graph);
        assert!(results.iter().any(|r| !r.passed));
        assert!(results.iter().all(|r| r.severity == Severity::Warning));
    }

    #[test]
    fn passes_when_helper_resolves_within_topology() {
        let devices = vec![device("a")];
        let interfaces = vec![svi(Some("10.0.10.53"))];
        let graph = assemble(&devices, &interfaces, &[], &[], &BTreeMap::new());
        let results = DhcpReachability.run(&graph);
        assert!(results.iter().all(|r| r.passed));
    }
}
