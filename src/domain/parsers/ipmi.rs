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

//! BMC network configuration from `ipmitool lan print`.
//!
//! One `key : value` block per LAN channel, blank-line separated. Channels
//! carry no stable identifier, so records are kept in input order. The MAC
//! address is re-keyed to `mac` with its colons removed, and a VLAN ID of
//! `Disabled` becomes a null `vlan_id`; other keys are stored verbatim under
//! their lower-cased, underscored form.

use crate::domain::entities::IpmiFacts;
use crate::domain::parsers::engine::{self, FieldRule, FormatSpec, Grammar, Opener, ValueRule};
use lazy_static::lazy_static;

lazy_static! {
    static ref SPEC: FormatSpec = FormatSpec {
        grammar: Grammar::Colon,
        opener: Opener::FirstField,
        dash_boundary: false,
        collapse_dangling_quotes: false,
        keyed: false,
        known_keys_only: false,
        require_key: None,
        rules: vec![
            FieldRule::exact(
                "mac_address",
                ValueRule::RenameStrippingChar {
                    to: "mac",
                    strip: ':',
                },
            ),
            FieldRule::exact(
                "802.1q_vlan_id",
                ValueRule::RenameNullWhen {
                    to: "vlan_id",
                    marker: "Disabled",
                },
            ),
        ],
    };
}

/// Parse `ipmitool lan print` output into LAN channel records
pub fn parse(raw: &str) -> IpmiFacts {
    IpmiFacts {
        channels: engine::parse(&SPEC, raw).into_sequential(),
    }
}
