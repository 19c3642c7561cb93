use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::interface::{Duplex, InterfaceMode, InterfaceState};

/// One line the parser could not confidently classify. Parsing never fails
/// outright on a single bad line; it accumulates warnings and keeps going.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseWarning {
    pub line_number: usize,
    pub raw_line: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedVlan {
    pub id: u16,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedInterface {
    pub name: String,
    pub description: Option<String>,
    pub mode: InterfaceMode,
    pub vlan_access: Option<u16>,
    pub vlan_trunk_allowed: BTreeSet<u16>,
    pub native_vlan: Option<u16>,
    pub ip_address: Option<String>,
    pub ip_mask: Option<String>,
    pub dhcp_helper: Option<String>,
    pub duplex: Option<Duplex>,
    pub state: InterfaceState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingProtocol {
    Static,
    Ospf,
    Eigrp,
    Bgp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticRoute {
    pub destination: String,
    pub mask: String,
    pub next_hop: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AclStanza {
    pub name: String,
    pub rules: Vec<String>,
}

/// Full output of parsing one device's raw running config: a hostname, its
/// interfaces in file order, its VLAN database, the routing protocols in
/// use, any static routes, and any ACLs, plus whatever couldn't be parsed
/// along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDevice {
    pub hostname: String,
    pub interfaces: Vec<ParsedInterface>,
    pub vlans: Vec<ParsedVlan>,
    pub routing_protocols: Vec<RoutingProtocol>,
    pub static_routes: Vec<StaticRoute>,
    pub acls: Vec<AclStanza>,
    pub warnings: Vec<ParseWarning>,
}
