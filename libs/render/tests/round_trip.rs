//! Render then re-parse then render again: confirms the renderer's output is
//! itself valid input to `netval-parser` and that nothing recognized is lost
//! on the way through.

use netval_model::{InterfaceMode, InterfaceState, ParsedDevice, ParsedInterface, ParsedVlan};
use std::collections::BTreeSet;

fn sample_device() -> ParsedDevice {
    ParsedDevice {
        hostname: "SW-ACCESS-01".into(),
        vlans: vec![ParsedVlan { id: 20, name: "VOICE".into() }, ParsedVlan { id: 10, name: "DATA".into() }],
        interfaces: vec![
            ParsedInterface {
                name: "GigabitEthernet1/0/1".into(),
                description: Some("uplink to core".into()),
                mode: InterfaceMode::Trunk,
                vlan_access: None,
                vlan_trunk_allowed: BTreeSet::from([10, 20, 21, 22, 30]),
                native_vlan: Some(1),
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
fn parse_then_render_round_trips_recognized_fields() {
    let original = sample_device();
    let rendered_once = netval_render::render(&original);

    let reparsed = netval_parser::parse_running_config(&rendered_once);
    assert!(reparsed.warnings.is_empty(), "rendered output must be free of parse warnings: {:?}", reparsed.warnings);
    assert_eq!(reparsed.hostname, original.hostname);

    let rendered_twice = netval_render::render(&reparsed);
    assert_eq!(rendered_once, rendered_twice);
}

#[test]
fn trunk_allow_list_survives_the_round_trip_as_the_same_set() {
    let original = sample_device();
    let rendered = netval_render::render(&original);
    let reparsed = netval_parser::parse_running_config(&rendered);

    let original_trunk = &original.interfaces[0].vlan_trunk_allowed;
    let reparsed_trunk = &reparsed.interfaces.iter().find(|i| i.name == "GigabitEthernet1/0/1").expect("uplink interface").vlan_trunk_allowed;
    assert_eq!(original_trunk, reparsed_trunk);
}
