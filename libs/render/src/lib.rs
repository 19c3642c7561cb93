//! The inverse of `netval-parser`: given a device sub-model, emits a
//! deterministic CLI block. Rendering is pure — calling `render` twice on
//! equal input produces identical output byte-for-byte — and whitespace is
//! controlled so no stray blank lines leak out of template expansion.

use netval_model::{InterfaceMode, ParsedDevice, ParsedInterface, ParsedVlan, RoutingProtocol};

/// Renders a full CLI block for `device`: hostname, VLAN declarations sorted
/// by id, interface stanzas sorted by (kind, numeric path) with trunk
/// allow-lists sorted numerically, static routes, routing protocol stanzas,
/// ACLs, and a trailing `end`.
pub fn render(device: &ParsedDevice) -> String {
    let mut out = String::new();

    out.push_str(&format!("hostname {}\n", device.hostname));
    out.push_str("!\n");

    let mut vlans: Vec<&ParsedVlan> = device.vlans.iter().collect();
    vlans.sort_by_key(|v| v.id);
    for vlan in vlans {
        out.push_str(&format!("vlan {}\n", vlan.id));
        out.push_str(&format!(" name {}\n", vlan.name));
        out.push_str("!\n");
    }

    let mut interfaces: Vec<&ParsedInterface> = device.interfaces.iter().collect();
    interfaces.sort_by(|a, b| interface_sort_key(&a.name).cmp(&interface_sort_key(&b.name)));
    for interface in interfaces {
        render_interface(&mut out, interface);
    }

    for route in &device.static_routes {
        out.push_str(&format!("ip route {} {} {}\n", route.destination, route.mask, route.next_hop));
    }
    if !device.static_routes.is_empty() {
        out.push_str("!\n");
    }

    let mut protocols = device.routing_protocols.clone();
    protocols.sort_by_key(protocol_sort_key);
    for protocol in protocols {
        if let Some(stanza) = protocol_stanza(protocol) {
            out.push_str(&format!("{stanza}\n!\n"));
        }
    }

    for acl in &device.acls {
        out.push_str(&format!("ip access-list extended {}\n", acl.name));
        for rule in &acl.rules {
            out.push_str(&format!(" {rule}\n"));
        }
        out.push_str("!\n");
    }

    out.push_str("end\n");
    out
}

fn render_interface(out: &mut String, interface: &ParsedInterface) {
    out.push_str(&format!("interface {}\n", interface.name));
    if let Some(description) = &interface.description {
        out.push_str(&format!(" description {description}\n"));
    }

    match interface.mode {
        InterfaceMode::Access => {
            out.push_str(" switchport mode access\n");
            if let Some(vlan) = interface.vlan_access {
                out.push_str(&format!(" switchport access vlan {vlan}\n"));
            }
        }
        InterfaceMode::Trunk => {
            out.push_str(" switchport mode trunk\n");
            if let Some(native) = interface.native_vlan {
                out.push_str(&format!(" switchport trunk native vlan {native}\n"));
            }
            if interface.vlan_trunk_allowed.is_empty() {
                out.push_str(" switchport trunk allowed vlan none\n");
            } else {
                let ranges = collapse_to_ranges(&interface.vlan_trunk_allowed);
                out.push_str(&format!(" switchport trunk allowed vlan {}\n", ranges.join(",")));
            }
        }
        InterfaceMode::Routed | InterfaceMode::Unknown => {}
    }

    if let (Some(address), Some(mask)) = (&interface.ip_address, &interface.ip_mask) {
        out.push_str(&format!(" ip address {address} {mask}\n"));
    }

    if let Some(helper) = &interface.dhcp_helper {
        out.push_str(&format!(" ip helper-address {helper}\n"));
    }

    if let Some(duplex) = interface.duplex {
        let word = match duplex {
            netval_model::Duplex::Full => "full",
            netval_model::Duplex::Half => "half",
            netval_model::Duplex::Auto => "auto",
        };
        out.push_str(&format!(" duplex {word}\n"));
    }

    if matches!(interface.state, netval_model::InterfaceState::Down) {
        out.push_str(" shutdown\n");
    } else {
        out.push_str(" no shutdown\n");
    }

    out.push_str("!\n");
}

/// Collapses a sorted VLAN id set back into the compact `a,b-c,d` notation
/// the parser's `expand_trunk_range` would recover identical ids from.
fn collapse_to_ranges(ids: &std::collections::BTreeSet<u16>) -> Vec<String> {
    let mut ranges = Vec::new();
    let mut iter = ids.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end = iter.next().unwrap();
        }
        if start == end {
            ranges.push(start.to_string());
        } else {
            ranges.push(format!("{start}-{end}"));
        }
    }
    ranges
}

/// (kind-order, numeric path) so `Vlan10` sorts after physical interfaces and
/// `GigabitEthernet1/0/2` sorts before `GigabitEthernet1/0/10` numerically
/// rather than lexically.
fn interface_sort_key(name: &str) -> (u8, Vec<u32>) {
    let kind = if name.to_ascii_lowercase().starts_with("vlan") {
        3
    } else if name.starts_with("Loopback") {
        2
    } else if name.starts_with("Port-channel") {
        1
    } else {
        0
    };
    let path: Vec<u32> = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .collect::<String>()
        .split(['/', '.'])
        .filter_map(|s| s.parse().ok())
        .collect();
    (kind, path)
}

fn protocol_sort_key(protocol: RoutingProtocol) -> u8 {
    match protocol {
        RoutingProtocol::Static => 0,
        RoutingProtocol::Ospf => 1,
        RoutingProtocol::Eigrp => 2,
        RoutingProtocol::Bgp => 3,
    }
}

fn protocol_stanza(protocol: RoutingProtocol) -> Option<&'static str> {
    match protocol {
        RoutingProtocol::Static => None,
        RoutingProtocol::Ospf => Some("router ospf 1"),
        RoutingProtocol::Eigrp => Some("router eigrp 1"),
        RoutingProtocol::Bgp => Some("router bgp 65000"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netval_model::{InterfaceState, ParsedInterface, ParsedVlan};
    use std::collections::BTreeSet;

    fn sample_device() -> ParsedDevice {
        ParsedDevice {
            hostname: "SW-ACCESS-01".into(),
            vlans: vec![
                ParsedVlan { id: 20, name: "VOICE".into() },
                ParsedVlan { id: 10, name: "DATA".into() },
            ],
            interfaces: vec![
                ParsedInterface {
                    name: "GigabitEthernet1/0/1".into(),
                    description: Some("uplink to core".into()),
                    mode: InterfaceMode::Trunk,
                    vlan_access: None,
                    vlan_trunk_allowed: BTreeSet::from([10, 20, 21, 22, 30]),
                    native_vlan: None,
                    ip_address: None,
                    ip_mask: None,
                    dhcp_helper: None,
                    duplex: None,
                    state: InterfaceState::Up,
                },
                ParsedInterface {
                    name: "Vlan10".into(),
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
                },
            ],
            routing_protocols: vec![],
            static_routes: vec![],
            acls: vec![],
            warnings: vec![],
        }
    }

    #[test]
    fn renders_vlans_sorted_by_id() {
        let text = render(&sample_device());
        let data_pos = text.find("vlan 10").unwrap();
        let voice_pos = text.find("vlan 20").unwrap();
        assert!(data_pos < voice_pos);
    }

    #[test]
    fn collapses_trunk_allow_list_back_into_ranges() {
        let text = render(&sample_device());
        assert!(text.contains("switchport trunk allowed vlan 10,20-22,30"));
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let device = sample_device();
        assert_eq!(render(&device), render(&device));
    }

    #[test]
    fn ends_with_trailing_end_stanza() {
        let text = render(&sample_device());
        assert!(text.trim_end().ends_with("end"));
    }
}
