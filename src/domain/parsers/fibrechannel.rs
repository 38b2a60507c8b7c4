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

//! Fibre-channel host topology from `systool -c fc_host -v`.
//!
//! The output is a series of indented `key = "value"` blocks separated by
//! blank lines. A `Class Device` field opens each host record and carries
//! the record identifier; everything before it (the class banner) is
//! ignored. `systool` occasionally wraps a value so that the closing quote
//! lands on its own line, which the tokenizer pre-pass folds back.

use crate::domain::entities::FibreChannelFacts;
use crate::domain::parsers::engine::{self, FieldRule, FormatSpec, Grammar, Opener, ValueRule};
use lazy_static::lazy_static;

lazy_static! {
    static ref SPEC: FormatSpec = FormatSpec {
        grammar: Grammar::Equals,
        opener: Opener::FieldValue("Class Device"),
        dash_boundary: false,
        collapse_dangling_quotes: true,
        keyed: true,
        known_keys_only: false,
        require_key: None,
        rules: vec![
            FieldRule::exact("Class Device path", ValueRule::Drop),
            FieldRule::prefix("supported_", ValueRule::SplitList(", ")),
            FieldRule::suffix("_type", ValueRule::FirstToken),
            FieldRule::suffix("_name", ValueRule::StripHexPrefix),
            FieldRule::exact("port_id", ValueRule::StripHexPrefix),
        ],
    };
}

/// Parse `systool -c fc_host -v` output into hosts keyed by device name
pub fn parse(raw: &str) -> FibreChannelFacts {
    FibreChannelFacts {
        hosts: engine::parse(&SPEC, raw).into_keyed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FactValue;

    const SYSTOOL_OUTPUT: &str = r#"Class = "fc_host"

  Class Device = "host0"
  Class Device path = "/sys/devices/pci0000:00/0000:00:03.0/host0/fc_host/host0"
    fabric_name         = "0x100000051e34401f"
    issue_lip           = <store method only>
    node_name           = "0x200000e08b909221"
    port_id             = "0x0000e8"
    port_name           = "0x210000e08b909221"
    port_state          = "Online"
    port_type           = "NPort (fabric via point-to-point)"
    speed               = "2 Gbit"
    supported_classes   = "Class 3"
    supported_speeds    = "1 Gbit, 2 Gbit, 4 Gbit"
    tgtid_bind_type     = "wwpn (World Wide Port Name)"

  Class Device = "host1"
  Class Device path = "/sys/devices/pci0000:00/0000:00:04.0/host1/fc_host/host1"
    node_name           = "0x200100e08b909221"
    port_id             = "0x000000"
    port_state          = "Linkdown"
"#;

    #[test]
    fn test_hosts_keyed_by_class_device() {
        let facts = parse(SYSTOOL_OUTPUT);
        assert_eq!(facts.hosts.len(), 2);
        assert!(facts.hosts.contains_key("host0"));
        assert!(facts.hosts.contains_key("host1"));
    }

    #[test]
    fn test_hex_prefix_stripped_from_names_and_port_id() {
        let facts = parse(SYSTOOL_OUTPUT);
        let host0 = &facts.hosts["host0"];
        assert_eq!(host0["node_name"], FactValue::from("200000e08b909221"));
        assert_eq!(host0["port_name"], FactValue::from("210000e08b909221"));
        assert_eq!(host0["fabric_name"], FactValue::from("100000051e34401f"));
        assert_eq!(host0["port_id"], FactValue::from("0000e8"));
    }

    #[test]
    fn test_type_fields_reduced_to_first_token() {
        let facts = parse(SYSTOOL_OUTPUT);
        let host0 = &facts.hosts["host0"];
        assert_eq!(host0["port_type"], FactValue::from("NPort"));
        assert_eq!(host0["tgtid_bind_type"], FactValue::from("wwpn"));
    }

    #[test]
    fn test_supported_fields_split_into_lists() {
        let facts = parse(SYSTOOL_OUTPUT);
        let host0 = &facts.hosts["host0"];
        assert_eq!(
            host0["supported_speeds"],
            FactValue::List(vec![
                "1 Gbit".to_string(),
                "2 Gbit".to_string(),
                "4 Gbit".to_string()
            ])
        );
        assert_eq!(
            host0["supported_classes"],
            FactValue::List(vec!["Class 3".to_string()])
        );
    }

    #[test]
    fn test_device_path_and_unquoted_values_dropped() {
        let facts = parse(SYSTOOL_OUTPUT);
        let host0 = &facts.hosts["host0"];
        assert!(!host0.contains_key("Class Device path"));
        assert!(!host0.contains_key("issue_lip"));
    }

    #[test]
    fn test_trailing_record_flushed_without_boundary() {
        let raw = "  Class Device = \"host0\"\n    state = \"Online\"";
        let facts = parse(raw);
        assert_eq!(facts.hosts["host0"]["state"], FactValue::from("Online"));
    }

    #[test]
    fn test_dangling_closing_quote_collapsed() {
        let raw = concat!(
            "  Class Device = \"host0\"\n",
            "    symbolic_name       = \"QLE2562 FW:v8.03.00\n",
            "\"\n",
        );
        let facts = parse(raw);
        assert_eq!(
            facts.hosts["host0"]["symbolic_name"],
            FactValue::from("QLE2562 FW:v8.03.00")
        );
    }

    #[test]
    fn test_class_banner_outside_record_ignored() {
        // the top-level class line opens nothing and stores nothing
        let facts = parse("Class = \"fc_host\"\n\n");
        assert!(facts.hosts.is_empty());
    }

    #[test]
    fn test_path_only_record_suppressed() {
        let raw = concat!(
            "  Class Device = \"host3\"\n",
            "  Class Device path = \"/sys/devices/host3\"\n",
            "\n",
        );
        let facts = parse(raw);
        assert!(facts.hosts.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").hosts.is_empty());
    }
}
