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

//! Generic line-oriented record parser.
//!
//! Inventory and neighbor-discovery tools (`systool`, `ipmitool`,
//! `lldpcli`, switch CLI dumps) emit loosely formatted, indentation- and
//! blank-line-delimited text meant for human reading. The formats share one
//! shape: records separated by boundary lines, `key = "value"` or
//! `key: value` field lines inside a record, and a handful of per-key value
//! transforms. This module is the single engine for that shape; each format
//! supplies a [`FormatSpec`] describing its grammar, boundary style, record
//! opener and normalization table.
//!
//! Parsing is a pure single pass over a fully buffered string. The record
//! assembler is a two-state machine (no record open / record open); a commit
//! fires on every boundary line and once more at end of input, so a trailing
//! record without a closing boundary is never lost. Lines that match neither
//! a boundary nor the field grammar are dropped silently: a stray header or
//! human-readable caption must not abort extraction of the well-formed rest.

use crate::domain::entities::{FactValue, Record, ResultSet};
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;

lazy_static! {
    /// `key = "value"`: optional indentation, key without '=', quoted value
    static ref EQUALS_LINE_RE: Regex =
        Regex::new(r#"^\s*(?P<key>[^=]+?)\s*=\s*"(?P<val>[^"]*)"\s*$"#).unwrap();
    /// `key: value`: optional indentation, key without ':', at least one
    /// space after the colon
    static ref COLON_LINE_RE: Regex =
        Regex::new(r"^\s*(?P<key>[^:]+?)\s*:\s+(?P<val>.+)$").unwrap();
}

/// Line grammar used by the field extractor
#[derive(Debug, Clone, Copy)]
pub enum Grammar {
    /// `key = "quoted value"`; the key is trimmed but otherwise kept as-is
    Equals,
    /// `key: value`; the key is trimmed, lower-cased, and internal spaces
    /// become underscores (`IP Address` -> `ip_address`)
    Colon,
}

impl Grammar {
    /// Match a non-boundary line against this grammar, producing a raw
    /// (key, value) pair. Lines that don't match yield `None` and are
    /// dropped by the caller.
    fn extract(&self, line: &str) -> Option<(String, String)> {
        let (key, value) = match self {
            Grammar::Equals => {
                let caps = EQUALS_LINE_RE.captures(line)?;
                let key = caps.name("key")?.as_str().trim().to_string();
                (key, caps.name("val")?.as_str().trim().to_string())
            }
            Grammar::Colon => {
                let caps = COLON_LINE_RE.captures(line)?;
                let key = caps
                    .name("key")?
                    .as_str()
                    .trim()
                    .to_lowercase()
                    .replace(' ', "_");
                (key, caps.name("val")?.as_str().trim().to_string())
            }
        };
        if key.is_empty() {
            return None;
        }
        Some((key, value))
    }
}

/// How a new record is opened
#[derive(Debug)]
pub enum Opener {
    /// The first extracted field opens a record implicitly
    FirstField,
    /// A field with this exact key opens a record; its value becomes the
    /// record identifier and is not stored as a field. Field lines seen
    /// while no record is open are dropped.
    FieldValue(&'static str),
    /// A header line matching this pattern opens a record keyed by the first
    /// capture group; the header itself contributes no field.
    HeaderLine(Regex),
    /// A header line matching this pattern opens a record and stores the
    /// first capture group as a field under `field` instead of using it as
    /// the record identifier. Field lines seen while no record is open are
    /// dropped.
    HeaderField {
        pattern: Regex,
        field: &'static str,
    },
}

/// Key pattern selecting a normalization rule
#[derive(Debug, Clone, Copy)]
pub enum KeyPattern {
    Exact(&'static str),
    Prefix(&'static str),
    Suffix(&'static str),
}

impl KeyPattern {
    fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Exact(s) => key == *s,
            KeyPattern::Prefix(p) => key.starts_with(p),
            KeyPattern::Suffix(s) => key.ends_with(s),
        }
    }
}

/// Per-key value transformation, applied after extraction and before
/// assembly. Keys matching no rule fall through to verbatim storage; the
/// normalizer never rejects an unrecognized key.
#[derive(Debug, Clone, Copy)]
pub enum ValueRule {
    /// Field is ignored entirely (e.g. sysfs device paths)
    Drop,
    /// Value split on the separator into a list of strings
    SplitList(&'static str),
    /// Value reduced to its first whitespace-delimited token
    FirstToken,
    /// One leading literal `0x` stripped from the value
    StripHexPrefix,
    /// Field re-keyed, with every occurrence of a character removed from
    /// the value (`mac_address` -> `mac` without colons)
    RenameStrippingChar {
        to: &'static str,
        strip: char,
    },
    /// Field re-keyed; a sentinel value (e.g. `Disabled`) maps to null
    RenameNullWhen {
        to: &'static str,
        marker: &'static str,
    },
    /// Value accumulated into a growing list instead of overwritten. Only
    /// the token before the first comma is kept, case-folded, and only when
    /// the text at the comma starts with the marker (`", on"`); unmarked
    /// values are discarded. The list itself is created on first sight of
    /// the key either way.
    AccumulateMarked(&'static str),
    /// Field re-keyed; a sentinel value (`mgmt0`, `not advertised`) drops
    /// the field entirely instead of storing it
    RenameDropWhen {
        to: &'static str,
        marker: &'static str,
    },
    /// Field re-keyed; value reduced to one whitespace-delimited token by
    /// position. A value with too few tokens drops the field.
    RenameTokenAt {
        to: &'static str,
        index: usize,
    },
}

/// One row of a format's normalization table
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub pattern: KeyPattern,
    pub rule: ValueRule,
}

impl FieldRule {
    pub fn exact(key: &'static str, rule: ValueRule) -> Self {
        Self {
            pattern: KeyPattern::Exact(key),
            rule,
        }
    }

    pub fn prefix(prefix: &'static str, rule: ValueRule) -> Self {
        Self {
            pattern: KeyPattern::Prefix(prefix),
            rule,
        }
    }

    pub fn suffix(suffix: &'static str, rule: ValueRule) -> Self {
        Self {
            pattern: KeyPattern::Suffix(suffix),
            rule,
        }
    }
}

/// Complete description of one source format
#[derive(Debug)]
pub struct FormatSpec {
    pub grammar: Grammar,
    pub opener: Opener,
    /// Whether a line starting with a run of dashes also closes the current
    /// record (a blank line always does)
    pub dash_boundary: bool,
    /// Pre-pass collapsing a line holding only a closing quote onto the
    /// previous line; `systool` emits the closing quote of some values on
    /// its own line
    pub collapse_dangling_quotes: bool,
    /// Keyed (mapping) or sequential (list) result shape
    pub keyed: bool,
    /// When set, keys matching no rule are dropped instead of stored
    /// verbatim. Extraction formats that project a handful of fields out of
    /// a verbose dump use this; inventory formats keep the default
    /// passthrough.
    pub known_keys_only: bool,
    /// When set, a record is only committed if it carries this key; records
    /// missing it are discarded at flush like empty ones
    pub require_key: Option<&'static str>,
    /// Normalization table; first matching pattern wins
    pub rules: Vec<FieldRule>,
}

/// Outcome of normalizing one extracted field
enum Normalized {
    Drop,
    Store(String, FactValue),
    Append { key: String, item: Option<String> },
}

fn normalize(spec: &FormatSpec, key: String, value: String) -> Normalized {
    for field_rule in &spec.rules {
        if !field_rule.pattern.matches(&key) {
            continue;
        }
        return match field_rule.rule {
            ValueRule::Drop => Normalized::Drop,
            ValueRule::SplitList(sep) => Normalized::Store(
                key,
                FactValue::List(value.split(sep).map(str::to_string).collect()),
            ),
            ValueRule::FirstToken => Normalized::Store(
                key,
                FactValue::Text(
                    value
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                ),
            ),
            ValueRule::StripHexPrefix => {
                Normalized::Store(key, FactValue::Text(value.replacen("0x", "", 1)))
            }
            ValueRule::RenameStrippingChar { to, strip } => Normalized::Store(
                to.to_string(),
                FactValue::Text(value.chars().filter(|c| *c != strip).collect()),
            ),
            ValueRule::RenameNullWhen { to, marker } => {
                let normalized = if value == marker {
                    FactValue::Null
                } else {
                    FactValue::Text(value)
                };
                Normalized::Store(to.to_string(), normalized)
            }
            ValueRule::AccumulateMarked(marker) => {
                let item = value.find(',').and_then(|idx| {
                    value[idx..]
                        .starts_with(marker)
                        .then(|| value[..idx].to_lowercase())
                });
                Normalized::Append { key, item }
            }
            ValueRule::RenameDropWhen { to, marker } => {
                if value == marker {
                    Normalized::Drop
                } else {
                    Normalized::Store(to.to_string(), FactValue::Text(value))
                }
            }
            ValueRule::RenameTokenAt { to, index } => {
                match value.split_whitespace().nth(index) {
                    Some(token) => {
                        Normalized::Store(to.to_string(), FactValue::Text(token.to_string()))
                    }
                    None => Normalized::Drop,
                }
            }
        };
    }
    if spec.known_keys_only {
        return Normalized::Drop;
    }
    // Unknown keys default to verbatim storage
    Normalized::Store(key, FactValue::Text(value))
}

/// Record assembler: holds the currently-open record and the result being
/// built. States are `{no-record, open-record}`; `flush` is the mandatory
/// commit transition, fired on boundary lines and at end of input.
struct Assembler {
    keyed: bool,
    require_key: Option<&'static str>,
    current: Option<OpenRecord>,
    keyed_out: BTreeMap<String, Record>,
    sequential_out: Vec<Record>,
}

struct OpenRecord {
    id: Option<String>,
    fields: Record,
}

impl Assembler {
    fn new(spec: &FormatSpec) -> Self {
        Self {
            keyed: spec.keyed,
            require_key: spec.require_key,
            current: None,
            keyed_out: BTreeMap::new(),
            sequential_out: Vec::new(),
        }
    }

    fn is_open(&self) -> bool {
        self.current.is_some()
    }

    fn open(&mut self, id: Option<String>) {
        self.current = Some(OpenRecord {
            id,
            fields: Record::new(),
        });
    }

    fn merge(&mut self, normalized: Normalized) {
        let Some(record) = self.current.as_mut() else {
            return;
        };
        match normalized {
            Normalized::Drop => {}
            Normalized::Store(key, value) => {
                record.fields.insert(key, value);
            }
            Normalized::Append { key, item } => {
                let entry = record
                    .fields
                    .entry(key)
                    .or_insert_with(|| FactValue::List(Vec::new()));
                if let (FactValue::List(items), Some(item)) = (entry, item) {
                    items.push(item);
                }
            }
        }
    }

    /// Commit the open record, if any. Empty or all-ignored records are
    /// discarded, never committed as blank entries, as are records missing
    /// their required key; a boundary with no open record is a no-op.
    fn flush(&mut self) {
        let Some(record) = self.current.take() else {
            return;
        };
        if record.fields.is_empty() {
            return;
        }
        if let Some(key) = self.require_key {
            if !record.fields.contains_key(key) {
                return;
            }
        }
        if self.keyed {
            if let Some(id) = record.id {
                // last-write-wins for duplicate identifiers
                self.keyed_out.insert(id, record.fields);
            }
        } else {
            self.sequential_out.push(record.fields);
        }
    }

    fn finish(mut self) -> ResultSet {
        self.flush();
        if self.keyed {
            ResultSet::Keyed(self.keyed_out)
        } else {
            ResultSet::Sequential(self.sequential_out)
        }
    }
}

/// Parse raw tool output according to a format description.
///
/// A pure function: any text, including empty text, yields a (possibly
/// empty) result. Nothing here performs I/O or touches shared state, so
/// independent inputs can be parsed concurrently without coordination.
pub fn parse(spec: &FormatSpec, raw: &str) -> ResultSet {
    let text: Cow<'_, str> = if spec.collapse_dangling_quotes {
        Cow::Owned(raw.replace("\n\"\n", "\"\n"))
    } else {
        Cow::Borrowed(raw)
    };

    let mut assembler = Assembler::new(spec);

    for line in text.lines() {
        if is_boundary(spec, line) {
            assembler.flush();
            continue;
        }

        match &spec.opener {
            Opener::HeaderLine(re) => {
                if let Some(caps) = re.captures(line) {
                    assembler.flush();
                    let id = caps.get(1).map(|m| m.as_str().trim().to_string());
                    assembler.open(id);
                    continue;
                }
            }
            Opener::HeaderField { pattern, field } => {
                if let Some(caps) = pattern.captures(line) {
                    assembler.flush();
                    assembler.open(None);
                    if let Some(m) = caps.get(1) {
                        assembler.merge(Normalized::Store(
                            field.to_string(),
                            FactValue::Text(m.as_str().trim().to_string()),
                        ));
                    }
                    continue;
                }
            }
            _ => {}
        }

        let Some((key, value)) = spec.grammar.extract(line) else {
            // no grammar match: deliberate no-op, tolerates stray headers
            continue;
        };

        if !assembler.is_open() {
            match &spec.opener {
                Opener::FirstField => assembler.open(None),
                Opener::FieldValue(id_key) => {
                    if key == *id_key {
                        assembler.open(Some(value));
                    }
                    continue;
                }
                // fields outside any record are dropped for header-opened
                // formats
                Opener::HeaderLine(_) | Opener::HeaderField { .. } => continue,
            }
        }

        assembler.merge(normalize(spec, key, value));
    }

    assembler.finish()
}

fn is_boundary(spec: &FormatSpec, line: &str) -> bool {
    if line.trim().is_empty() {
        return true;
    }
    spec.dash_boundary && line.starts_with("---")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colon_spec() -> FormatSpec {
        FormatSpec {
            grammar: Grammar::Colon,
            opener: Opener::FirstField,
            dash_boundary: false,
            collapse_dangling_quotes: false,
            keyed: false,
            known_keys_only: false,
            require_key: None,
            rules: Vec::new(),
        }
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        assert!(parse(&colon_spec(), "").is_empty());
        assert!(parse(&colon_spec(), "\n\n\n").is_empty());
    }

    #[test]
    fn test_unmatched_lines_are_dropped() {
        let result = parse(&colon_spec(), "no separator here\n=== banner ===\n");
        assert!(result.is_empty());
    }

    #[test]
    fn test_unknown_key_stored_verbatim_under_normalized_key() {
        let result = parse(&colon_spec(), "IP Address Source:  Static Address\n");
        let records = result.into_sequential();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0]["ip_address_source"],
            FactValue::from("Static Address")
        );
    }

    #[test]
    fn test_blank_line_closes_record() {
        let result = parse(&colon_spec(), "a: 1\n\nb: 2\n");
        let records = result.into_sequential();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["a"], FactValue::from("1"));
        assert_eq!(records[1]["b"], FactValue::from("2"));
    }

    #[test]
    fn test_end_of_input_flushes_open_record() {
        // no trailing boundary line at all
        let result = parse(&colon_spec(), "a: 1");
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_boundary_without_open_record_is_noop() {
        let result = parse(&colon_spec(), "\n\na: 1\n");
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_dropped_only_record_is_never_committed() {
        let spec = FormatSpec {
            rules: vec![FieldRule::exact("path", ValueRule::Drop)],
            ..colon_spec()
        };
        let result = parse(&spec, "Path:  /sys/devices/pci0000:00\n\n");
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_colon_key_is_rejected() {
        // ipmitool continuation lines have nothing before the colon
        let result = parse(&colon_spec(), "           : User     : MD2 MD5\n");
        assert!(result.is_empty());
    }

    #[test]
    fn test_equals_grammar_requires_closing_quote() {
        let spec = FormatSpec {
            grammar: Grammar::Equals,
            ..colon_spec()
        };
        let result = parse(&spec, "  issue_lip = <store method only>\n  state = \"Online\"\n");
        let records = result.into_sequential();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 1);
        assert_eq!(records[0]["state"], FactValue::from("Online"));
    }

    #[test]
    fn test_accumulate_creates_list_even_when_unmarked() {
        let spec = FormatSpec {
            rules: vec![FieldRule::exact(
                "capability",
                ValueRule::AccumulateMarked(", on"),
            )],
            ..colon_spec()
        };
        let result = parse(&spec, "Capability:  Router, off\n");
        let records = result.into_sequential();
        assert_eq!(records[0]["capability"], FactValue::List(Vec::new()));
    }

    #[test]
    fn test_unknown_keys_dropped_when_restricted_to_known_keys() {
        let spec = FormatSpec {
            known_keys_only: true,
            rules: vec![FieldRule::exact("state", ValueRule::Drop)],
            ..colon_spec()
        };
        let result = parse(&spec, "State:  up\nSpeed:  10 Gbit\n");
        assert!(result.is_empty());
    }

    #[test]
    fn test_record_missing_required_key_is_discarded() {
        let spec = FormatSpec {
            require_key: Some("name"),
            ..colon_spec()
        };
        let raw = "Speed:  10 Gbit\n\nName:  eth0\nSpeed:  1 Gbit\n";
        let records = parse(&spec, raw).into_sequential();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], FactValue::from("eth0"));
    }

    #[test]
    fn test_rename_drop_when_discards_sentinel_value() {
        let spec = FormatSpec {
            rules: vec![FieldRule::exact(
                "system_name",
                ValueRule::RenameDropWhen {
                    to: "hostname",
                    marker: "not advertised",
                },
            )],
            ..colon_spec()
        };
        let records =
            parse(&spec, "System Name: not advertised\nSystem Name: node12\n").into_sequential();
        assert_eq!(records[0]["hostname"], FactValue::from("node12"));
    }

    #[test]
    fn test_rename_token_at_picks_token_by_position() {
        let spec = FormatSpec {
            rules: vec![FieldRule::exact(
                "portid",
                ValueRule::RenameTokenAt {
                    to: "switchport",
                    index: 1,
                },
            )],
            ..colon_spec()
        };
        let records = parse(&spec, "PortID:       ifname Eth1/5\n").into_sequential();
        assert_eq!(records[0]["switchport"], FactValue::from("Eth1/5"));
    }

    #[test]
    fn test_rename_token_at_drops_field_when_token_missing() {
        let spec = FormatSpec {
            rules: vec![FieldRule::exact(
                "portid",
                ValueRule::RenameTokenAt {
                    to: "switchport",
                    index: 1,
                },
            )],
            ..colon_spec()
        };
        let records = parse(&spec, "PortID: lone\nState:  up\n").into_sequential();
        assert!(!records[0].contains_key("switchport"));
        assert_eq!(records[0]["state"], FactValue::from("up"));
    }

    #[test]
    fn test_header_field_opener_stores_capture_as_field() {
        let spec = FormatSpec {
            opener: Opener::HeaderField {
                pattern: Regex::new(r"^Interface:\s+([^,]+),").unwrap(),
                field: "hostport",
            },
            ..colon_spec()
        };
        let raw = "Interface:    eth0, via: LLDP\n    SysName:      sw01\n";
        let records = parse(&spec, raw).into_sequential();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["hostport"], FactValue::from("eth0"));
        assert_eq!(records[0]["sysname"], FactValue::from("sw01"));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let spec = FormatSpec {
            rules: vec![
                FieldRule::exact("port_type", ValueRule::Drop),
                FieldRule::suffix("_type", ValueRule::FirstToken),
            ],
            ..colon_spec()
        };
        let result = parse(&spec, "Port Type:  NPort (fabric)\nBind Type:  wwpn (World Wide)\n");
        let records = result.into_sequential();
        assert_eq!(records.len(), 1);
        assert!(!records[0].contains_key("port_type"));
        assert_eq!(records[0]["bind_type"], FactValue::from("wwpn"));
    }
}
