//! Parsing for `vlan <id>` / ` name <name>` stanzas in the VLAN database.

use netval_model::{vlan::is_legal_vlan_id, ParsedVlan};

/// Parses a `vlan <id>` stanza (the id already stripped by the caller) plus
/// its indented body, returning `None` if the id is out of the legal 802.1Q
/// range (the caller attaches a [`ParseWarning`]), and the number of body
/// lines consumed.
pub fn parse_vlan_stanza(id_token: &str, body: &[&str]) -> (Option<ParsedVlan>, usize) {
    let id: Option<u16> = id_token.trim().parse().ok().filter(|id| is_legal_vlan_id(*id));

    let mut name = None;
    let mut consumed = 0usize;
    for line in body {
        let trimmed = line.trim();
        let indented = line.len() != trimmed.len();
        if !indented && !trimmed.is_empty() && trimmed != "!" {
            break;
        }
        consumed += 1;
        if let Some(rest) = trimmed.strip_prefix("name ") {
            name = Some(rest.trim().to_string());
        }
    }

    let vlan = id.map(|id| ParsedVlan { id, name: name.unwrap_or_else(|| format!("VLAN{id:04}")) });
    (vlan, consumed)
}
