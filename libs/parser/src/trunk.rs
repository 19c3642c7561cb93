//! Trunk allowed-vlan range expansion: "10,20-30,40" → flat sorted set.

use std::collections::BTreeSet;

/// Expands a comma-separated list of VLAN ids and `a-b` ranges into a flat,
/// sorted set. IDs outside the legal 1..4094 range are silently dropped
/// (callers that need a warning trail check the result against their input).
/// An inverted range (`15-12`) is treated as invalid and contributes nothing,
/// per the boundary behavior the parser is required to tolerate rather than
/// panic on.
pub fn expand_trunk_range(clause: &str) -> BTreeSet<u16> {
    let mut out = BTreeSet::new();
    for token in clause.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some((low, high)) = token.split_once('-') {
            let (Ok(low), Ok(high)) = (low.trim().parse::<u16>(), high.trim().parse::<u16>()) else {
                continue;
            };
            if low > high {
                continue;
            }
            for id in low..=high {
                if netval_model::vlan::is_legal_vlan_id(id) {
                    out.insert(id);
                }
            }
        } else if let Ok(id) = token.parse::<u16>() {
            if netval_model::vlan::is_legal_vlan_id(id) {
                out.insert(id);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_mixed_list_and_range() {
        assert_eq!(expand_trunk_range("10,20-22,30"), BTreeSet::from([10, 20, 21, 22, 30]));
    }

    #[test]
    fn inverted_range_yields_nothing() {
        assert_eq!(expand_trunk_range("15-12"), BTreeSet::new());
    }

    #[test]
    fn out_of_range_ids_are_dropped() {
        assert_eq!(expand_trunk_range("1,4094,4095,0"), BTreeSet::from([1, 4094]));
    }

    #[test]
    fn empty_clause_yields_empty_set() {
        assert_eq!(expand_trunk_range(""), BTreeSet::new());
    }
}
