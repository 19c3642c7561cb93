//! ROUTING_BLACKHOLE: static routes on a device must have a next hop
//! resolvable on one of its routed/SVI interfaces.

use crate::graph::TopologyGraph;
use crate::net::in_subnet;
use crate::registry::{finding, Check};
use netval_model::{CheckResult, InterfaceMode, Severity};

pub struct RoutingBlackhole;

impl Check for RoutingBlackhole {
    fn check_id(&self) -> &'static str {
        "ROUTING_BLACKHOLE"
    }

    fn name(&self) -> &'static str {
        "Static route next-hop resolution"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn run(&self, graph: &TopologyGraph) -> Vec<CheckResult> {
        let mut results = Vec::new();

        for node_index in graph.nodes_sorted() {
            let node = graph.node(node_index);
            let routed_interfaces: Vec<_> = node
                .interfaces
                .values()
                .filter(|iface| iface.mode == InterfaceMode::Routed && iface.ip_address.is_some())
                .collect();

            for route in &node.static_routes {
                let resolved = routed_interfaces
                    .iter()
                    .any(|iface| in_subnet(&route.next_hop, iface.ip_address.as_deref().unwrap_or(""), iface.ip_mask.as_deref().unwrap_or("")));

                results.push(finding(
                    self,
                    resolved,
                    Some(node.device_id.clone()),
                    None,
                    if resolved {
                        format!("next hop {} for {}/{} resolves on a routed interface", route.next_hop, route.destination, route.mask)
                    } else {
                        format!(
                            "next hop {} for route {}/{} on {} does not resolve on any routed/SVI interface",
                            route.next_hop, route.destination, route.mask, node.hostname
                        )
                    },
                    if resolved { None } else { Some(format!("ip route {} {} {}", route.destination, route.mask, route.next_hop)) },
                ));
            }
        }

        if results.is_empty() {
            results.push(finding(self, true, None, None, "no static routes in this topology", None));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::assemble;
    use netval_model::{Device, DeviceRole, Interface, InterfaceState, StaticRoute};
    use std::collections::{BTreeMap, BTreeSet};

    fn device(id: &str) -> Device {
        Device {
            id: id.into(),
            project_id: "p1".into(),
            hostname: "RTR-A".into(),
            role: DeviceRole::Router,
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

    fn routed_if(device_id: &str) -> Interface {
        Interface {
            id: "i1".into(),
            device_id: device_id.into(),
            name: "GigabitEthernet0/1".into(),
            description: None,
            mode: InterfaceMode::Routed,
            vlan_access: None,
            vlan_trunk_allowed: BTreeSet::new(),
            native_vlan: None,
            ip_address: Some("10.0.10.1".into()),
            ip_mask: Some("255.255.255.0".into()),
            dhcp_helper: None,
            duplex: None,
            state: InterfaceState::Up,
        }
    }

    #[test]
    fn fails_when_next_hop_resolves_on_nothing() {
        let devices = vec![device("a")];
        let interfaces = vec![routed_if("a")];
        let mut routes = BTreeMap::new();
        routes.insert("a".to_string(), vec![StaticRoute { destination: "0.0.0.0".into(), mask: "0.0.0.0".into(), next_hop: "192.168.1.1".into() }]);
        let graph = assemble(&devices, &interfaces, &[], &[], &routes);
        let results = RoutingBlackhole.run(&graph);
        assert!(results.iter().any(|r| !r.passed));
    }

    #[test]
    fn passes_when_next_hop_resolves_on_a_routed_interface() {
        let devices = vec![device("a")];
        let interfaces = vec![routed_if("a")];
        let mut routes = BTreeMap::new();
        routes.insert("a".to_string(), vec![StaticRoute { destination: "0.0.0.0".into(), mask: "0.0.0.0".into(), next_hop: "10.0.10.254".into() }]);
        let graph = assemble(&devices, &interfaces, &[], &[], &routes);
        let results = RoutingBlackhole.run(&graph);
        assert!(results.iter().all(|r| r.passed));
    }
}
