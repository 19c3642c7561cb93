//! VLAN_CONTINUITY: for every edge, every VLAN in the edge's allow-list must
//! be present in both endpoints' VLAN databases.

use crate::graph::TopologyGraph;
use crate::registry::{finding, Check};
use netval_model::{CheckResult, Severity};

pub struct VlanContinuity;

impl Check for VlanContinuity {
    fn check_id(&self) -> &'static str {
        "VLAN_CONTINUITY"
    }

    fn name(&self) -> &'static str {
        "VLAN continuity across trunks"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn run(&self, graph: &TopologyGraph) -> Vec<CheckResult> {
        let mut results = Vec::new();

        for node_index in graph.nodes_sorted() {
            let node = graph.node(node_index);
            for edge_index in graph.edges_sorted(node_index) {
                let far_index = graph.other_endpoint(edge_index, node_index);
                let far = graph.node(far_index);
                // Each undirected edge is visited from both endpoints; only
                // evaluate it once, from the lexically-first device id.
                if far.device_id < node.device_id {
                    continue;
                }

                let edge = graph.edge(edge_index);
                for vlan in &edge.vlan_allow_list {
                    for endpoint in [node, far] {
                        if !endpoint.vlans.contains(vlan) {
                            let peer = if endpoint.device_id == node.device_id { &far.hostname } else { &node.hostname };
                            results.push(finding(
                                self,
                                false,
                                Some(endpoint.device_id.clone()),
                                edge.interface_on(&endpoint.device_id).map(str::to_string),
                                format!(
                                    "VLAN {vlan} is allowed on the trunk to {peer} but is not in {here}'s VLAN database",
                                    here = endpoint.hostname,
                                ),
                                Some(format!("vlan {vlan}\n name VLAN{vlan}")),
                            ));
                        }
                    }
                }
            }
        }

        if results.is_empty() {
            results.push(finding(self, true, None, None, "every trunk allow-list is continuous at both endpoints", None));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::assemble;
    use netval_model::{Device, DeviceRole, DeviceVlan, Link, LinkMedium, LinkState};
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
    fn flags_vlan_missing_on_one_endpoint() {
        let devices = vec![device("a", "SW-A"), device("b", "SW-B")];
        let vlans = vec![
            DeviceVlan { device_id: "a".into(), vlan_id: 10, name: "DATA".into() },
            DeviceVlan { device_id: "a".into(), vlan_id: 20, name: "VOICE".into() },
            DeviceVlan { device_id: "a".into(), vlan_id: 30, name: "MGMT".into() },
            DeviceVlan { device_id: "b".into(), vlan_id: 10, name: "DATA".into() },
            DeviceVlan { device_id: "b".into(), vlan_id: 20, name: "VOICE".into() },
        ];
        let links = vec![Link {
            id: "l1".into(),
            project_id: "p1".into(),
            source_device_id: "a".into(),
            source_interface: "Gi1/0/1".into(),
            target_device_id: "b".into(),
            target_interface: "Gi1/0/1".into(),
            medium: LinkMedium::Ethernet,
            vlan_allow_list: [10, 20, 30].into_iter().collect(),
            state: LinkState::Connected,
        }];
        let graph = assemble(&devices, &[], &vlans, &links, &BTreeMap::new());
        let results = VlanContinuity.run(&graph);
        let failure = results.iter().find(|r| !r.passed).expect("expected a failure");
        assert_eq!(failure.device_id.as_deref(), Some("b"));
        assert!(failure.detail.contains("VLAN 30"));
        assert_eq!(failure.suggested_fix.as_deref(), Some("vlan 30\n name VLAN30"));
    }

    #[test]
    fn passes_when_every_vlan_is_on_both_ends() {
        let devices = vec![device("a", "SW-A"), device("b", "SW-B")];
        let vlans = vec![
            DeviceVlan { device_id: "a".into(), vlan_id: 10, name: "DATA".into() },
            DeviceVlan { device_id: "b".into(), vlan_id: 10, name: "DATA".into() },
        ];
        let links = vec![Link {
            id: "l1".into(),
            project_id: "p1".into(),
            source_device_id: "a".into(),
            source_interface: "Gi1/0/1".into(),
            target_device_id: "b".into(),
            target_interface: "Gi1/0/1".into(),
            medium: LinkMedium::Ethernet,
            vlan_allow_list: [10].into_iter().collect(),
            state: LinkState::Connected,
        }];
        let graph = assemble(&devices, &[], &vlans, &links, &BTreeMap::new());
        let results = VlanContinuity.run(&graph);
        assert!(results.iter().all(|r| r.passed));
    }
}
