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

//! Switch-to-host link extraction for port labeling.
//!
//! Correlating which switch port a host hangs off requires the same link
//! seen from both ends: `parse_cisco` reads a switch's
//! `show lldp neighbors detail` dump, `parse_lldpcli` reads a host's
//! `lldpcli show neighbors` output. Both project a handful of fields out of
//! verbose per-neighbor blocks into flat link records (`switchname`,
//! `switchport`, `hostname`, `hostport`); a record without a switch port is
//! useless for labeling and is discarded. The management interface and
//! fields reported as `not advertised` are excluded.

use crate::domain::entities::{FactValue, NeighborLinks};
use crate::domain::parsers::engine::{self, FieldRule, FormatSpec, Grammar, Opener, ValueRule};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CISCO_SPEC: FormatSpec = FormatSpec {
        grammar: Grammar::Colon,
        opener: Opener::FirstField,
        dash_boundary: false,
        collapse_dangling_quotes: false,
        keyed: false,
        known_keys_only: true,
        require_key: Some("switchport"),
        rules: vec![
            FieldRule::exact(
                "local_port_id",
                ValueRule::RenameDropWhen {
                    to: "switchport",
                    marker: "mgmt0",
                },
            ),
            FieldRule::exact(
                "port_description",
                ValueRule::RenameDropWhen {
                    to: "hostport",
                    marker: "not advertised",
                },
            ),
            FieldRule::exact(
                "system_name",
                ValueRule::RenameDropWhen {
                    to: "hostname",
                    marker: "not advertised",
                },
            ),
        ],
    };
    static ref LLDPCLI_SPEC: FormatSpec = FormatSpec {
        grammar: Grammar::Colon,
        opener: Opener::HeaderField {
            pattern: Regex::new(r"^Interface:\s+([^,]+),").unwrap(),
            field: "hostport",
        },
        dash_boundary: true,
        collapse_dangling_quotes: false,
        keyed: false,
        known_keys_only: true,
        require_key: Some("switchport"),
        rules: vec![
            FieldRule::exact(
                "sysname",
                ValueRule::RenameTokenAt {
                    to: "switchname",
                    index: 0,
                },
            ),
            // `PortID: ifname Eth1/5`: the port name is the second token,
            // after the subtype
            FieldRule::exact(
                "portid",
                ValueRule::RenameTokenAt {
                    to: "switchport",
                    index: 1,
                },
            ),
        ],
    };
}

/// Parse a switch's `show lldp neighbors detail` output into links.
///
/// Seen from the switch side, `Local Port id` is the switch port and the
/// advertised `System Name`/`Port Description` name the attached host and
/// its interface. The switch's own name is not in the dump; the caller
/// knows which device it asked.
pub fn parse_cisco(raw: &str) -> NeighborLinks {
    NeighborLinks {
        links: engine::parse(&CISCO_SPEC, raw).into_sequential(),
    }
}

/// Parse a host's `lldpcli show neighbors` output into links.
///
/// Seen from the host side, the `Interface:` header names the host port and
/// the advertised `SysName`/`PortID` name the switch and its port. The
/// host's own name is supplied by the caller and stamped onto every link.
pub fn parse_lldpcli(hostname: &str, raw: &str) -> NeighborLinks {
    let mut links = engine::parse(&LLDPCLI_SPEC, raw).into_sequential();
    for link in &mut links {
        link.insert("hostname".to_string(), FactValue::from(hostname));
    }
    NeighborLinks { links }
}
