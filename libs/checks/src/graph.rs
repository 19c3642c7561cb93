//! Topology Assembler: loads a project's devices and links into an in-memory
//! undirected graph annotated with VLAN sets, interface maps, and per-link
//! trunk allow-lists.

use netval_model::{Device, DeviceRole, DeviceVlan, Interface, Link, StaticRoute};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Node attributes: hostname, role, the device's VLAN database, its
/// interface map keyed by name, its management IP, and the static routes
/// carried by its most recently parsed configuration (routing protocols
/// themselves are not modeled in the graph; only the destinations checks
/// need to resolve next hops against).
#[derive(Debug, Clone)]
pub struct NodeData {
    pub device_id: String,
    pub hostname: String,
    pub role: DeviceRole,
    pub vlans: BTreeSet<u16>,
    pub interfaces: BTreeMap<String, Interface>,
    pub management_ip: Option<String>,
    pub static_routes: Vec<StaticRoute>,
}

/// Edge attributes carry medium, the two interface names (endpoint-ordered so
/// callers can tell which side is which even though the graph itself is
/// undirected for pathfinding), and the allow-list.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub link_id: String,
    pub medium: netval_model::LinkMedium,
    pub source_device_id: String,
    pub source_interface: String,
    pub target_device_id: String,
    pub target_interface: String,
    pub vlan_allow_list: BTreeSet<u16>,
}

impl EdgeData {
    /// The interface name on `device_id`'s side of this edge, if it is an endpoint.
    pub fn interface_on(&self, device_id: &str) -> Option<&str> {
        if device_id == self.source_device_id {
            Some(&self.source_interface)
        } else if device_id == self.target_device_id {
            Some(&self.target_interface)
        } else {
            None
        }
    }
}

/// The assembled topology: an undirected graph over devices, immutable for
/// the duration of one check pass.
pub struct TopologyGraph {
    pub graph: UnGraph<NodeData, EdgeData>,
    by_device_id: HashMap<String, NodeIndex>,
    by_hostname: BTreeMap<String, NodeIndex>,
}

impl TopologyGraph {
    pub fn node_index(&self, device_id: &str) -> Option<NodeIndex> {
        self.by_device_id.get(device_id).copied()
    }

    pub fn node_by_hostname(&self, hostname: &str) -> Option<NodeIndex> {
        self.by_hostname.get(hostname).copied()
    }

    pub fn node(&self, index: NodeIndex) -> &NodeData {
        &self.graph[index]
    }

    pub fn device(&self, device_id: &str) -> Option<&NodeData> {
        self.node_index(device_id).map(|index| self.node(index))
    }

    /// All device nodes, ordered by device id. Collections are sorted before
    /// iteration throughout this crate so repeated runs are byte-identical.
    pub fn nodes_sorted(&self) -> Vec<NodeIndex> {
        let mut indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        indices.sort_by_key(|&index| self.graph[index].device_id.clone());
        indices
    }

    pub fn nodes_with_role(&self, role: DeviceRole) -> Vec<NodeIndex> {
        self.nodes_sorted().into_iter().filter(|&index| self.graph[index].role == role).collect()
    }

    /// Edge indices incident to `index`, ordered by the device-id of the
    /// neighbor at the far end — breaks pathfinding ties deterministically.
    pub fn edges_sorted(&self, index: NodeIndex) -> Vec<EdgeIndex> {
        let mut edges: Vec<EdgeIndex> = self.graph.edges(index).map(|edge| edge.id()).collect();
        edges.sort_by_key(|&edge_index| {
            let (a, b) = self.graph.edge_endpoints(edge_index).unwrap();
            let other = if a == index { b } else { a };
            self.graph[other].device_id.clone()
        });
        edges
    }

    pub fn edge(&self, index: EdgeIndex) -> &EdgeData {
        &self.graph[index]
    }

    pub fn other_endpoint(&self, edge: EdgeIndex, from: NodeIndex) -> NodeIndex {
        let (a, b) = self.graph.edge_endpoints(edge).unwrap();
        if a == from {
            b
        } else {
            a
        }
    }

    pub fn hostnames_sorted(&self) -> Vec<String> {
        self.by_hostname.keys().cloned().collect()
    }
}

/// Builds a [`TopologyGraph`] from a project's already-loaded rows. Nodes are
/// devices; edges are links. `interfaces` and `vlans` are grouped by the
/// device they belong to before insertion so node construction is O(1) per
/// device rather than re-scanning the full interface/vlan lists per device.
///
/// `static_routes_by_device` carries each device's static-route stanzas as
/// last recovered from its most recent configuration parse; the persisted
/// topology model itself has no routing-table entity, so the caller (the
/// server's simulation job) supplies this separately, typically by
/// re-parsing the device's latest `ConfigSnapshot`.
pub fn assemble(
    devices: &[Device],
    interfaces: &[Interface],
    vlans: &[DeviceVlan],
    links: &[Link],
    static_routes_by_device: &BTreeMap<String, Vec<StaticRoute>>,
) -> TopologyGraph {
    let mut interfaces_by_device: BTreeMap<&str, BTreeMap<String, Interface>> = BTreeMap::new();
    for interface in interfaces {
        interfaces_by_device.entry(&interface.device_id).or_default().insert(interface.name.clone(), interface.clone());
    }

    let mut vlans_by_device: BTreeMap<&str, BTreeSet<u16>> = BTreeMap::new();
    for vlan in vlans {
        vlans_by_device.entry(&vlan.device_id).or_default().insert(vlan.vlan_id);
    }

    let mut graph = UnGraph::new_undirected();
    let mut by_device_id = HashMap::with_capacity(devices.len());
    let mut by_hostname = BTreeMap::new();

    for device in devices {
        let node = NodeData {
            device_id: device.id.clone(),
            hostname: device.hostname.clone(),
            role: device.role,
            vlans: vlans_by_device.remove(device.id.as_str()).unwrap_or_default(),
            interfaces: interfaces_by_device.remove(device.id.as_str()).unwrap_or_default(),
            management_ip: device.management_ip.clone(),
            static_routes: static_routes_by_device.get(&device.id).cloned().unwrap_or_default(),
        };
        let index = graph.add_node(node);
        by_device_id.insert(device.id.clone(), index);
        by_hostname.insert(device.hostname.clone(), index);
    }

    for link in links {
        let (Some(&source), Some(&target)) = (by_device_id.get(&link.source_device_id), by_device_id.get(&link.target_device_id)) else {
            continue;
        };
        graph.add_edge(
            source,
            target,
            EdgeData {
                link_id: link.id.clone(),
                medium: link.medium,
                source_device_id: link.source_device_id.clone(),
                source_interface: link.source_interface.clone(),
                target_device_id: link.target_device_id.clone(),
                target_interface: link.target_interface.clone(),
                vlan_allow_list: link.vlan_allow_list.clone(),
            },
        );
    }

    TopologyGraph { graph, by_device_id, by_hostname }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netval_model::{InterfaceMode, InterfaceState, LinkMedium, LinkState};

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

    fn link(id: &str, source: &str, target: &str, allow: &[u16]) -> Link {
        Link {
            id: id.into(),
            project_id: "p1".into(),
            source_device_id: source.into(),
            source_interface: "Gi1/0/1".into(),
            target_device_id: target.into(),
            target_interface: "Gi1/0/2".into(),
            medium: LinkMedium::Ethernet,
            vlan_allow_list: allow.iter().copied().collect(),
            state: LinkState::Connected,
        }
    }

    #[test]
    fn assembles_nodes_and_edges_from_rows() {
        let devices = vec![device("d1", "SW-A", DeviceRole::Switch), device("d2", "SW-B", DeviceRole::Switch)];
        let links = vec![link("l1", "d1", "d2", &[10, 20])];
        let topology = assemble(&devices, &[], &[], &links, &BTreeMap::new());
        assert!(topology.device("d1").is_some());
        assert_eq!(topology.hostnames_sorted(), vec!["SW-A".to_string(), "SW-B".to_string()]);

        let a = topology.node_index("d1").unwrap();
        let edges = topology.edges_sorted(a);
        assert_eq!(edges.len(), 1);
        assert_eq!(topology.edge(edges[0]).vlan_allow_list, BTreeSet::from([10, 20]));
    }

    #[test]
    fn ignores_links_whose_endpoint_device_is_missing() {
        let devices = vec![device("d1", "SW-A", DeviceRole::Switch)];
        let links = vec![link("l1", "d1", "ghost", &[10])];
        let topology = assemble(&devices, &[], &[], &links, &BTreeMap::new());
        assert_eq!(topology.graph.edge_count(), 0);
    }

    #[test]
    fn groups_interfaces_and_vlans_per_device() {
        let devices = vec![device("d1", "SW-A", DeviceRole::Switch)];
        let interface = Interface {
            id: "i1".into(),
            device_id: "d1".into(),
            name: "Gi1/0/1".into(),
            description: None,
            mode: InterfaceMode::Access,
            vlan_access: Some(10),
            vlan_trunk_allowed: BTreeSet::new(),
            native_vlan: None,
            ip_address: None,
            ip_mask: None,
            dhcp_helper: None,
            duplex: None,
            state: InterfaceState::Up,
        };
        let vlan = DeviceVlan { device_id: "d1".into(), vlan_id: 10, name: "DATA".into() };
        let topology = assemble(&devices, &[interface], &[vlan], &[], &BTreeMap::new());
        let node = topology.device("d1").unwrap();
        assert!(node.interfaces.contains_key("Gi1/0/1"));
        assert!(node.vlans.contains(&10));
    }
}
