//! IP prefix-list flavor: 11 fixed attribute slots (declared prefix
//! length, length-range low/high, then up to 8 address octets/hextets).
//! Unlike ACLs, prefix-list lines carry no hard compatibility gate — any
//! two lines can in principle be merged, at a cost.

use std::collections::HashMap;

use serde_json::Value;

use crate::constants::LINE_PENALTY_PREFIX;
use crate::error::MinerError;
use crate::error::Result;
use crate::model::{Action, Block, BlockSequence, Line};

use super::{ParamValueMap, SegmentFlavor};

pub const ATTRIBUTES: usize = 11;

const IPV4: &str = "0";
const IPV6: &str = "1";

pub struct PrefixListFlavor;

impl SegmentFlavor for PrefixListFlavor {
    fn name(&self) -> &'static str {
        "prefix-list"
    }

    fn attribute_count(&self) -> usize {
        ATTRIBUTES
    }

    fn line_penalty(&self) -> u32 {
        LINE_PENALTY_PREFIX
    }

    fn line_score(&self, template_line: &Line, device_line: &Line, param_value_map: &ParamValueMap) -> u32 {
        let mut score = 0u32;
        for i in 0..ATTRIBUTES {
            match (template_line.attr(i), device_line.attr(i)) {
                (Some(t), Some(d)) if t == d => {}
                (Some(t), Some(d)) => {
                    let compatible = param_value_map
                        .get(t)
                        .is_some_and(|values| values.contains_key(d));
                    score += if compatible { 1 } else { 2 };
                }
                _ => score += 2,
            }
        }
        score
    }

    fn parse(&self, name: &str, device: &str, vendor_format: &str, json: &Value) -> Result<BlockSequence> {
        parse_prefix_list(name, device, vendor_format, json)
    }

    fn format_block(
        &self,
        vendor_format: &str,
        action: Action,
        lines: &[Line],
        line_predicate: &HashMap<i64, String>,
        pattern: &str,
    ) -> String {
        let format = vendor_format.to_ascii_lowercase();
        let mut output = String::new();
        if format.contains("juniper") {
            let common = format!("set policy-options prefix-list {pattern}");
            for line in lines {
                let predicate = line_predicate.get(&line.identity).cloned().unwrap_or_default();
                let network = address(line);
                let len_clause = length_clause_juniper(line);
                output.push_str(&format!(
                    "{:<3}: {:<3}: {} {} {}\n",
                    line.identity, predicate, common, network, len_clause
                ));
            }
        } else if format.contains("cisco") || format.contains("arista") {
            let family = if line_family(lines) == IPV6 { "ipv6" } else { "ip" };
            let common = format!("{family} prefix-list {pattern} {} ", action.as_str());
            for line in lines {
                let predicate = line_predicate.get(&line.identity).cloned().unwrap_or_default();
                let network = address(line);
                let len_clause = length_clause_cisco(line);
                output.push_str(&format!(
                    "{:<3}: {:<3}: {common}{network}{len_clause}\n",
                    line.identity, predicate
                ));
            }
        }
        output
    }
}

fn line_family(lines: &[Line]) -> &str {
    lines.first().and_then(|l| l.tag.as_deref()).unwrap_or(IPV4)
}

fn address(line: &Line) -> String {
    if line.tag.as_deref() == Some(IPV6) {
        format!(
            "{}/{}",
            (3..11).map(|i| line.attr(i).unwrap_or("0").to_string()).collect::<Vec<_>>().join(":"),
            line.attr(0).unwrap_or("128")
        )
    } else {
        format!(
            "{}/{}",
            (3..7).map(|i| line.attr(i).unwrap_or("0").to_string()).collect::<Vec<_>>().join("."),
            line.attr(0).unwrap_or("32")
        )
    }
}

fn length_clause_juniper(line: &Line) -> String {
    let (own, lo, hi) = (line.attr(0), line.attr(1), line.attr(2));
    if own == lo && lo == hi {
        "exact".to_string()
    } else if own == lo {
        format!("upto /{}", hi.unwrap_or_default())
    } else {
        format!("prefix-length-range /{}-/{}", lo.unwrap_or_default(), hi.unwrap_or_default())
    }
}

fn length_clause_cisco(line: &Line) -> String {
    let (own, lo, hi) = (line.attr(0), line.attr(1), line.attr(2));
    let own_v = own.unwrap_or_default();
    if own == lo && lo == hi {
        " ".to_string()
    } else if own == lo {
        format!("/{own_v} le {}", hi.unwrap_or_default())
    } else if lo == hi && own != lo {
        format!("/{own_v} eq {}", lo.unwrap_or_default())
    } else if lo == hi {
        format!("/{own_v} ge {}", lo.unwrap_or_default())
    } else {
        format!("/{own_v} ge {} le {}", lo.unwrap_or_default(), hi.unwrap_or_default())
    }
}

fn shape_err(device: &str, segment: &str, reason: impl Into<String>) -> MinerError {
    MinerError::UnrecognizedShape {
        device: device.to_string(),
        segment: segment.to_string(),
        reason: reason.into(),
    }
}

fn parse_prefix_list(name: &str, device: &str, vendor_format: &str, json: &Value) -> Result<BlockSequence> {
    let mut sequence = BlockSequence::new(name, device, vendor_format);
    let entries = json
        .get("lines")
        .and_then(Value::as_array)
        .ok_or_else(|| shape_err(device, name, "missing \"lines\" array"))?;

    let mut current: Option<Block> = None;

    for (identity, entry) in entries.iter().enumerate() {
        let identity = identity as i64;
        let action = entry
            .get("action")
            .and_then(Value::as_str)
            .and_then(Action::parse)
            .ok_or_else(|| shape_err(device, name, "missing or unrecognized \"action\""))?;
        if current.as_ref().map(|b| b.action) != Some(action) {
            if let Some(block) = current.take() {
                sequence.blocks.push(block);
            }
            current = Some(Block::new(action));
        }

        let length_range = entry
            .get("lengthRange")
            .and_then(Value::as_str)
            .ok_or_else(|| shape_err(device, name, "missing \"lengthRange\""))?;
        let (lo, hi) = length_range
            .split_once('-')
            .ok_or_else(|| shape_err(device, name, format!("malformed lengthRange {length_range:?}")))?;

        let ip_wildcard = entry
            .get("ipWildcard")
            .and_then(Value::as_str)
            .ok_or_else(|| shape_err(device, name, "missing \"ipWildcard\""))?;

        let mut line = Line::new(None, identity, ATTRIBUTES);
        if ip_wildcard.contains(':') {
            line.tag = Some(IPV6.to_string());
            let (prefix, len) = ip_wildcard.split_once('/').unwrap_or((ip_wildcard, "128"));
            line.set_attr(0, len);
            for (i, group) in prefix.split(':').enumerate().take(8) {
                line.set_attr(3 + i, group);
            }
        } else {
            line.tag = Some(IPV4.to_string());
            let (prefix, len) = ip_wildcard.split_once('/').unwrap_or((ip_wildcard, "32"));
            line.set_attr(0, len);
            for (i, octet) in prefix.split('.').enumerate().take(4) {
                line.set_attr(3 + i, octet);
            }
            for i in 7..11 {
                line.set_attr(i, "0");
            }
        }
        line.set_attr(1, lo);
        line.set_attr(2, hi);

        current.as_mut().unwrap().lines.push(line);
    }

    if let Some(block) = current.take() {
        sequence.blocks.push(block);
    }
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ipv4_prefix_list() {
        let json = serde_json::json!({
            "lines": [{ "action": "PERMIT", "ipWildcard": "10.0.0.0/24", "lengthRange": "24-32" }]
        });
        let seq = parse_prefix_list("pl1", "r1", "cisco", &json).unwrap();
        assert_eq!(seq.blocks.len(), 1);
        let line = &seq.blocks[0].lines[0];
        assert_eq!(line.tag.as_deref(), Some(IPV4));
        assert_eq!(line.attr(0), Some("24"));
        assert_eq!(line.attr(3), Some("10"));
    }

    #[test]
    fn length_clause_exact_when_range_matches_own_length() {
        let mut line = Line::new(Some(IPV4.to_string()), 0, ATTRIBUTES);
        line.set_attr(0, "24");
        line.set_attr(1, "24");
        line.set_attr(2, "24");
        assert_eq!(length_clause_cisco(&line), " ");
    }
}
