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

//! Core domain entities for fact extraction

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A single normalized field value inside a record.
///
/// Values come out of the tool output as plain text; per-key normalization
/// may split them into lists (`supported_speeds`) or null them out
/// (a disabled VLAN setting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    /// Plain text value, surrounding whitespace already trimmed
    Text(String),
    /// Multi-valued field (e.g. supported speeds, capabilities)
    List(Vec<String>),
    /// Field present in the output but carrying no value
    Null,
}

impl FactValue {
    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FactValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// List content, if this is a list value
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FactValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        FactValue::Text(value)
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        FactValue::Text(value.to_string())
    }
}

/// One logical entity's field set: a fibre-channel host, a BMC LAN channel,
/// a link-layer neighbor.
///
/// `BTreeMap` keeps serialization deterministic, so re-parsing a serialized
/// result compares equal to the original.
pub type Record = BTreeMap<String, FactValue>;

/// The final output of one parse.
///
/// Output addressed by a unique identifier per record (device name, interface
/// name) is keyed; output with no natural identifier is an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultSet {
    /// Mapping from record identifier to record; a later record with the
    /// same identifier overwrites the earlier one
    Keyed(BTreeMap<String, Record>),
    /// Records in input order
    Sequential(Vec<Record>),
}

impl ResultSet {
    /// True when no record was committed
    pub fn is_empty(&self) -> bool {
        match self {
            ResultSet::Keyed(map) => map.is_empty(),
            ResultSet::Sequential(records) => records.is_empty(),
        }
    }

    /// Number of committed records
    pub fn len(&self) -> usize {
        match self {
            ResultSet::Keyed(map) => map.len(),
            ResultSet::Sequential(records) => records.len(),
        }
    }

    /// Consume the result as a keyed mapping; empty for a sequential result
    pub fn into_keyed(self) -> BTreeMap<String, Record> {
        match self {
            ResultSet::Keyed(map) => map,
            ResultSet::Sequential(_) => BTreeMap::new(),
        }
    }

    /// Consume the result as an ordered sequence; empty for a keyed result
    pub fn into_sequential(self) -> Vec<Record> {
        match self {
            ResultSet::Keyed(_) => Vec::new(),
            ResultSet::Sequential(records) => records,
        }
    }
}

/// Fibre-channel host topology extracted from `systool -c fc_host -v`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibreChannelFacts {
    /// Hosts keyed by class device name (e.g. "host0")
    pub hosts: BTreeMap<String, Record>,
}

/// BMC network configuration extracted from `ipmitool lan print`.
///
/// LAN channels carry no stable identifier, so they are kept in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IpmiFacts {
    pub channels: Vec<Record>,
}

/// Link-layer neighbors extracted from `lldpcli show neighbors`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LldpFacts {
    /// Neighbors keyed by local interface name
    pub neighbors: BTreeMap<String, Record>,
}

/// Switch-to-host links assembled from neighbor-discovery output, one
/// record per advertised connection.
///
/// Each link names the switch-side endpoint (`switchname`, `switchport`)
/// and the host-side endpoint (`hostname`, `hostport`); endpoints the
/// source did not advertise are absent from the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighborLinks {
    pub links: Vec<Record>,
}

/// Aggregated fact report.
///
/// A `None` fact means it was not collected: the platform confinement check
/// failed or the source tool is not installed. An empty fact means the tool
/// ran but produced no parseable records.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FactReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fibrechannel: Option<FibreChannelFacts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipmi: Option<IpmiFacts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lldp: Option<LldpFacts>,
}

impl FactReport {
    /// True when no fact was collected at all
    pub fn is_empty(&self) -> bool {
        self.fibrechannel.is_none() && self.ipmi.is_none() && self.lldp.is_none()
    }
}

/// Name of a collectable fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactName {
    Fibrechannel,
    Ipmi,
    Lldp,
}

impl FactName {
    /// Every fact this crate knows how to collect
    pub const ALL: [FactName; 3] = [FactName::Fibrechannel, FactName::Ipmi, FactName::Lldp];

    pub fn as_str(&self) -> &'static str {
        match self {
            FactName::Fibrechannel => "fibrechannel",
            FactName::Ipmi => "ipmi",
            FactName::Lldp => "lldp",
        }
    }
}

impl fmt::Display for FactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fibrechannel" => Ok(FactName::Fibrechannel),
            "ipmi" => Ok(FactName::Ipmi),
            "lldp" => Ok(FactName::Lldp),
            other => Err(DomainError::InvalidConfiguration(format!(
                "unknown fact name: {other}"
            ))),
        }
    }
}

/// Configuration options for fact collection
#[derive(Debug, Clone)]
pub struct CollectConfig {
    /// Facts to collect
    pub facts: Vec<FactName>,
    /// Whether to enforce the Linux/physical-hardware confinement checks
    pub confine: bool,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            facts: FactName::ALL.to_vec(),
            confine: true,
        }
    }
}
