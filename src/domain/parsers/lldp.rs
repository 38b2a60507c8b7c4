/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Link-layer neighbors from `lldpcli show neighbors`.
//!
//! Each neighbor block starts with an `Interface: <name>, ...` header line
//! and ends at a blank line or a dash separator. Section captions
//! (`chassis`, `port`) and TLV dumps are ignored; `capability` lines
//! accumulate into a list, keeping only capabilities reported as enabled
//! (`", on"`).

use crate::domain::entities::LldpFacts;
use crate::domain::parsers::engine::{self, FieldRule, FormatSpec, Grammar, Opener, ValueRule};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SPEC: FormatSpec = FormatSpec {
        grammar: Grammar::Colon,
        opener: Opener::HeaderLine(Regex::new(r"^Interface:\s+([^,]+),").unwrap()),
        dash_boundary: true,
        collapse_dangling_quotes: false,
        keyed: true,
        known_keys_only: false,
        require_key: None,
        rules: vec![
            FieldRule::exact("chassis", ValueRule::Drop),
            FieldRule::exact("port", ValueRule::Drop),
            FieldRule::exact("unknown_tlvs", ValueRule::Drop),
            FieldRule::exact("tlv", ValueRule::Drop),
            FieldRule::exact("capability", ValueRule::AccumulateMarked(", on")),
        ],
    };
}

/// Parse `lldpcli show neighbors` output into neighbors keyed by interface
pub fn parse(raw: &str) -> LldpFacts {
    LldpFacts {
        neighbors: engine::parse(&SPEC, raw).into_keyed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FactValue;

    const LLDPCLI_OUTPUT: &str = "\
-------------------------------------------------------------------------------
LLDP neighbors:
-------------------------------------------------------------------------------
Interface:    eth0, via: LLDP, RID: 1, Time: 0 day, 00:55:33
  Chassis:     mac 00:01:02:03:04:05
    SysName:      sw01.example.net
    SysDescr:     Cisco IOS Software, C2960 Software
    MgmtIP:       10.0.0.2
    Capability:   Bridge, on
    Capability:   Router, off
  Port:        ifname Gi0/12
    PortDescr:    uplink to rack 4
-------------------------------------------------------------------------------
Interface:    eth1, via: LLDP, RID: 2, Time: 0 day, 00:12:01
    SysName:      sw02.example.net
    Capability:   Bridge, on
    Capability:   Station, on
-------------------------------------------------------------------------------
";

    #[test]
    fn test_neighbors_keyed_by_interface() {
        let facts = parse(LLDPCLI_OUTPUT);
        assert_eq!(facts.neighbors.len(), 2);
        assert!(facts.neighbors.contains_key("eth0"));
        assert!(facts.neighbors.contains_key("eth1"));
    }

    #[test]
    fn test_fields_stored_under_folded_keys() {
        let facts = parse(LLDPCLI_OUTPUT);
        let eth0 = &facts.neighbors["eth0"];
        assert_eq!(eth0["sysname"], FactValue::from("sw01.example.net"));
        assert_eq!(eth0["mgmtip"], FactValue::from("10.0.0.2"));
        assert_eq!(eth0["portdescr"], FactValue::from("uplink to rack 4"));
    }

    #[test]
    fn test_chassis_and_port_captions_ignored() {
        let facts = parse(LLDPCLI_OUTPUT);
        let eth0 = &facts.neighbors["eth0"];
        assert!(!eth0.contains_key("chassis"));
        assert!(!eth0.contains_key("port"));
    }

    #[test]
    fn test_only_enabled_capabilities_accumulate() {
        let facts = parse(LLDPCLI_OUTPUT);
        assert_eq!(
            facts.neighbors["eth0"]["capability"],
            FactValue::List(vec!["bridge".to_string()])
        );
        assert_eq!(
            facts.neighbors["eth1"]["capability"],
            FactValue::List(vec!["bridge".to_string(), "station".to_string()])
        );
    }

    #[test]
    fn test_dash_separator_closes_record_without_blank_line() {
        let raw = "\
Interface:    eth0, via: LLDP, RID: 1
    SysName:      sw01
-----
Interface:    eth2, via: LLDP, RID: 3
    SysName:      sw03
";
        let facts = parse(raw);
        assert_eq!(facts.neighbors.len(), 2);
        assert_eq!(facts.neighbors["eth0"]["sysname"], FactValue::from("sw01"));
        assert_eq!(facts.neighbors["eth2"]["sysname"], FactValue::from("sw03"));
    }

    #[test]
    fn test_duplicate_interface_last_write_wins() {
        let raw = "\
Interface:    eth0, via: LLDP, RID: 1
    SysName:      old

Interface:    eth0, via: LLDP, RID: 4
    SysName:      new
";
        let facts = parse(raw);
        assert_eq!(facts.neighbors.len(), 1);
        assert_eq!(facts.neighbors["eth0"]["sysname"], FactValue::from("new"));
    }

    #[test]
    fn test_fields_before_any_header_dropped() {
        let facts = parse("    SysName:      orphan\n\n");
        assert!(facts.neighbors.is_empty());
    }

    #[test]
    fn test_header_only_record_suppressed() {
        let facts = parse("Interface:    eth5, via: LLDP, RID: 9\n\n");
        assert!(facts.neighbors.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").neighbors.is_empty());
    }
}
