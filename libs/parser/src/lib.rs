//! Converts a raw IOS-family running-configuration text blob into the
//! canonical device sub-model: hostname, interfaces, VLAN database, routing
//! protocols, static routes and ACLs.
//!
//! Parsing never aborts on unrecognized syntax. Stanzas the parser cannot
//! classify are retained verbatim for display and recorded as a per-stanza
//! [`ParseWarning`] rather than raising.

mod trunk;
mod vlan_db;

pub use trunk::expand_trunk_range;

use netval_model::{
    AclStanza, Duplex, InterfaceMode, InterfaceState, ParseWarning, ParsedDevice, ParsedInterface,
    ParsedVlan, RoutingProtocol, StaticRoute,
};
use std::collections::BTreeSet;
use tracing::instrument;

/// Parses `raw` into a [`ParsedDevice`]. Line endings are normalized to `\n`
/// before parsing; given identical input bytes the output is byte-identical
/// (order of interfaces, vlans, routes and acls all follow file order).
#[instrument(skip(raw))]
pub fn parse_running_config(raw: &str) -> ParsedDevice {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.lines().collect();

    let mut hostname = String::from("unknown");
    let mut interfaces = Vec::new();
    let mut vlans = Vec::new();
    let mut routing_protocols: Vec<RoutingProtocol> = Vec::new();
    let mut static_routes = Vec::new();
    let mut acls = Vec::new();
    let mut warnings = Vec::new();

    let mut index = 0usize;
    while index < lines.len() {
        let line_number = index + 1;
        let line = lines[index];
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('!') {
            index += 1;
            continue;
        }

        if let Some(name) = trimmed.strip_prefix("hostname ") {
            hostname = name.trim().to_string();
            index += 1;
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("vlan ") {
            let (vlan, consumed) = vlan_db::parse_vlan_stanza(rest, &lines[index + 1..]);
            if let Some(vlan) = vlan {
                vlans.push(vlan);
            } else {
                warnings.push(ParseWarning {
                    line_number,
                    raw_line: line.to_string(),
                    message: "vlan id out of 1..4094 range, dropped".to_string(),
                });
            }
            index += 1 + consumed;
            continue;
        }

        if trimmed.starts_with("interface ") {
            let name = trimmed["interface ".len()..].trim().to_string();
            let (interface, consumed) = parse_interface_stanza(&name, &lines[index + 1..]);
            interfaces.push(interface);
            index += 1 + consumed;
            continue;
        }

        if trimmed.starts_with("ip route ") {
            match parse_static_route(trimmed) {
                Some(route) => {
                    static_routes.push(route);
                    if !routing_protocols.contains(&RoutingProtocol::Static) {
                        routing_protocols.push(RoutingProtocol::Static);
                    }
                }
                None => warnings.push(ParseWarning {
                    line_number,
                    raw_line: line.to_string(),
                    message: "malformed static route stanza".to_string(),
                }),
            }
            index += 1;
            continue;
        }

        if let Some(protocol) = routing_protocol_stanza(trimmed) {
            if !routing_protocols.contains(&protocol) {
                routing_protocols.push(protocol);
            }
            index += 1;
            continue;
        }

        if trimmed.starts_with("ip access-list ") || trimmed.starts_with("access-list ") {
            let (acl, consumed) = parse_acl_stanza(trimmed, &lines[index + 1..]);
            acls.push(acl);
            index += 1 + consumed;
            continue;
        }

        if trimmed == "end" {
            index += 1;
            continue;
        }

        // Unrecognized top-level stanza: retained only as a warning, the raw
        // text itself is not re-emitted by this model (display layers read
        // the original upload, not this sub-model, for verbatim passthrough).
        warnings.push(ParseWarning {
            line_number,
            raw_line: line.to_string(),
            message: "unrecognized stanza, not normalized".to_string(),
        });
        index += 1;
    }

    vlans.sort_by_key(|v| v.id);
    ParsedDevice { hostname, interfaces, vlans, routing_protocols, static_routes, acls, warnings }
}

/// Parses an `interface <name>` stanza's body (the lines up to, but not
/// including, the next top-level stanza) and returns the parsed interface
/// plus the number of body lines consumed.
fn parse_interface_stanza(name: &str, body: &[&str]) -> (ParsedInterface, usize) {
    let mut description = None;
    let mut mode = InterfaceMode::Unknown;
    let mut vlan_access = None;
    let mut vlan_trunk_allowed = BTreeSet::new();
    let mut native_vlan = None;
    let mut ip_address = None;
    let mut ip_mask = None;
    let mut dhcp_helper = None;
    let mut duplex = None;
    let mut shutdown = false;
    let mut explicit_no_shutdown = false;
    let mut consumed = 0usize;

    for line in body {
        let trimmed = line.trim();
        if is_top_level_stanza(line) {
            break;
        }
        consumed += 1;

        if trimmed.is_empty() || trimmed == "!" {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("description ") {
            description = Some(rest.trim().to_string());
        } else if trimmed == "switchport mode access" {
            mode = InterfaceMode::Access;
        } else if trimmed == "switchport mode trunk" {
            mode = InterfaceMode::Trunk;
        } else if let Some(rest) = trimmed.strip_prefix("switchport access vlan ") {
            vlan_access = rest.trim().parse::<u16>().ok().filter(|id| netval_model::vlan::is_legal_vlan_id(*id));
        } else if let Some(rest) = trimmed.strip_prefix("switchport trunk allowed vlan ") {
            apply_trunk_clause(&mut vlan_trunk_allowed, rest.trim());
        } else if let Some(rest) = trimmed.strip_prefix("switchport trunk native vlan ") {
            native_vlan = rest.trim().parse::<u16>().ok().filter(|id| netval_model::vlan::is_legal_vlan_id(*id));
        } else if let Some(rest) = trimmed.strip_prefix("ip address ") {
            let mut parts = rest.split_whitespace();
            ip_address = parts.next().map(|s| s.to_string());
            ip_mask = parts.next().map(|s| s.to_string());
        } else if let Some(rest) = trimmed.strip_prefix("ip helper-address ") {
            dhcp_helper = Some(rest.trim().to_string());
        } else if let Some(rest) = trimmed.strip_prefix("duplex ") {
            duplex = match rest.trim() {
                "full" => Some(Duplex::Full),
                "half" => Some(Duplex::Half),
                "auto" => Some(Duplex::Auto),
                _ => None,
            };
        } else if trimmed == "shutdown" {
            shutdown = true;
        } else if trimmed == "no shutdown" {
            explicit_no_shutdown = true;
        }
    }

    // An interface with `ip address` set and not in switchport mode is
    // classified routed.
    if mode == InterfaceMode::Unknown && ip_address.is_some() {
        mode = InterfaceMode::Routed;
    }

    let state = if shutdown {
        InterfaceState::Down
    } else if explicit_no_shutdown || ip_address.is_some() || mode != InterfaceMode::Unknown {
        InterfaceState::Up
    } else {
        InterfaceState::Unknown
    };

    (
        ParsedInterface {
            name: name.to_string(),
            description,
            mode,
            vlan_access,
            vlan_trunk_allowed,
            native_vlan,
            ip_address,
            ip_mask,
            dhcp_helper,
            duplex,
            state,
        },
        consumed,
    )
}

fn apply_trunk_clause(current: &mut BTreeSet<u16>, clause: &str) {
    let mut words = clause.splitn(2, char::is_whitespace);
    let first = words.next().unwrap_or("");
    match first {
        "none" | "all" => current.clear(),
        "add" => {
            if let Some(rest) = words.next() {
                current.extend(expand_trunk_range(rest));
            }
        }
        "remove" => {
            if let Some(rest) = words.next() {
                for id in expand_trunk_range(rest) {
                    current.remove(&id);
                }
            }
        }
        _ => {
            current.clear();
            current.extend(expand_trunk_range(clause));
        }
    }
}

fn parse_static_route(line: &str) -> Option<StaticRoute> {
    let rest = line.strip_prefix("ip route ")?.trim();
    let mut parts = rest.split_whitespace();
    let destination = parts.next()?.to_string();
    let mask = parts.next()?.to_string();
    let next_hop = parts.next()?.to_string();
    Some(StaticRoute { destination, mask, next_hop })
}

fn routing_protocol_stanza(line: &str) -> Option<RoutingProtocol> {
    if line.starts_with("router ospf") {
        Some(RoutingProtocol::Ospf)
    } else if line.starts_with("router eigrp") {
        Some(RoutingProtocol::Eigrp)
    } else if line.starts_with("router bgp") {
        Some(RoutingProtocol::Bgp)
    } else {
        None
    }
}

fn parse_acl_stanza(header: &str, body: &[&str]) -> (AclStanza, usize) {
    let name = header
        .rsplit(' ')
        .next()
        .unwrap_or(header)
        .trim_start_matches("extended")
        .trim()
        .to_string();
    let mut rules = Vec::new();
    let mut consumed = 0usize;

    for line in body {
        let trimmed = line.trim();
        if is_top_level_stanza(line) {
            break;
        }
        consumed += 1;
        if !trimmed.is_empty() && trimmed != "!" {
            rules.push(trimmed.to_string());
        }
    }

    (AclStanza { name, rules }, consumed)
}

/// A line belongs to the *next* top-level stanza (and thus terminates the
/// current one's body) if it is unindented and not a comment/blank line.
fn is_top_level_stanza(line: &str) -> bool {
    let trimmed_start = line.trim_start();
    if trimmed_start.is_empty() {
        return false;
    }
    let indented = line.len() != trimmed_start.len();
    !indented && !trimmed_start.starts_with('!')
}
