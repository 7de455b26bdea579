//! ACL (extended access-list) flavor: 20 fixed attribute slots
//! (`srcIp`, `srcMask`, `dstIp`, `dstMask`, `srcPort`, `dstPort`, each as
//! dotted/range octets) plus a protocol tag used as a hard compatibility
//! gate in [`AclFlavor::line_score`].

use std::collections::HashMap;

use serde_json::Value;

use crate::constants::{INFINITY, LINE_PENALTY_ACL};
use crate::error::MinerError;
use crate::error::Result;
use crate::model::{Action, Block, BlockSequence, Line};

use super::{ParamValueMap, SegmentFlavor};

pub const ATTRIBUTES: usize = 20;

pub struct AclFlavor;

impl SegmentFlavor for AclFlavor {
    fn name(&self) -> &'static str {
        "acl"
    }

    fn attribute_count(&self) -> usize {
        ATTRIBUTES
    }

    fn line_penalty(&self) -> u32 {
        LINE_PENALTY_ACL
    }

    fn line_score(&self, template_line: &Line, device_line: &Line, param_value_map: &ParamValueMap) -> u32 {
        if template_line.tag != device_line.tag {
            return INFINITY;
        }
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
        parse_acl(name, device, vendor_format, json)
    }

    fn format_block(
        &self,
        _vendor_format: &str,
        action: Action,
        lines: &[Line],
        line_predicate: &HashMap<i64, String>,
        _pattern: &str,
    ) -> String {
        let mut output = String::new();
        let common = format!("\t{}", action.as_str());
        for line in lines {
            let predicate = line_predicate.get(&line.identity).cloned().unwrap_or_default();
            let protocol = line.tag.clone().unwrap_or_default().to_ascii_lowercase();

            let (src_network, src_wildcard) = (octets(line, 0..4), octets(line, 4..8));
            let src = if all_255(&src_wildcard) {
                ("any".to_string(), String::new())
            } else if all_0(&src_wildcard) {
                ("host".to_string(), src_network.join("."))
            } else {
                (src_network.join("."), src_wildcard.join("."))
            };

            let (dst_network, dst_wildcard) = (octets(line, 8..12), octets(line, 12..16));
            let dst = if all_255(&dst_wildcard) {
                ("any".to_string(), String::new())
            } else if all_0(&dst_wildcard) {
                ("host".to_string(), dst_network.join("."))
            } else {
                (dst_network.join("."), dst_wildcard.join("."))
            };

            let src_port = port_clause(line.attr(16), line.attr(17));
            let dst_port = port_clause(line.attr(18), line.attr(19));

            output.push_str(&format!(
                "{:<3}: {:<3}: {} {} {} {}{} {} {}{}\n",
                line.identity, predicate, common, protocol, src.0, src.1, src_port, dst.0, dst.1, dst_port
            ));
        }
        output
    }
}

fn octets(line: &Line, range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| line.attr(i).unwrap_or("0").to_string()).collect()
}

fn all_255(octets: &[String]) -> bool {
    octets.iter().all(|o| o == "255")
}

fn all_0(octets: &[String]) -> bool {
    octets.iter().all(|o| o == "0")
}

fn port_clause(lo: Option<&str>, hi: Option<&str>) -> String {
    match (lo, hi) {
        (Some("-1"), Some("-1")) | (None, _) | (_, None) => String::new(),
        (Some(lo), Some(hi)) if lo == hi => format!(" eq {lo}"),
        (Some(lo), Some(hi)) => format!(" range {lo} {hi}"),
    }
}

fn shape_err(device: &str, segment: &str, reason: impl Into<String>) -> MinerError {
    MinerError::UnrecognizedShape {
        device: device.to_string(),
        segment: segment.to_string(),
        reason: reason.into(),
    }
}

fn parse_acl(name: &str, device: &str, vendor_format: &str, json: &Value) -> Result<BlockSequence> {
    let mut sequence = BlockSequence::new(name, device, vendor_format);
    let lines = json
        .get("lines")
        .and_then(Value::as_array)
        .ok_or_else(|| shape_err(device, name, "missing \"lines\" array"))?;

    let mut current: Option<Block> = None;
    let mut identity = 0i64;

    for entry in lines {
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
        let block = current.as_mut().unwrap();

        let match_condition = entry
            .get("matchCondition")
            .ok_or_else(|| shape_err(device, name, "missing \"matchCondition\""))?;

        let (protocols, src_ips, dst_ips, src_ports, dst_ports) = if let Some(header_space) =
            match_condition.get("headerSpace")
        {
            let protocols = ip_protocols(header_space).unwrap_or_else(|| vec!["ip".to_string()]);
            let src_ips = src_or_dst_ips(header_space, "srcIps", device, name)?;
            let dst_ips = src_or_dst_ips(header_space, "dstIps", device, name)?;
            let dst_ports = ports(header_space, "dstPorts");
            let src_ports = ports(header_space, "srcPorts");
            (protocols, src_ips, dst_ips, src_ports, dst_ports)
        } else if let Some(conjuncts) = match_condition.get("conjuncts").and_then(Value::as_array) {
            let mut acc = Accumulator::default();
            process_disjuncts_conjuncts(conjuncts, &mut acc, device, name)?;
            let protocols = if acc.protocols.is_empty() { vec!["ip".to_string()] } else { acc.protocols };
            let src_ips = if acc.src_ips.is_empty() { vec!["0.0.0.0/0".to_string()] } else { acc.src_ips };
            let dst_ips = if acc.dst_ips.is_empty() { vec!["0.0.0.0/0".to_string()] } else { acc.dst_ips };
            (protocols, src_ips, dst_ips, acc.src_ports, acc.dst_ports)
        } else {
            return Err(shape_err(device, name, "matchCondition has neither headerSpace nor conjuncts"));
        };

        for protocol in &protocols {
            for src_prefix in &src_ips {
                let (src_ip, src_mask) = ip_and_mask(src_prefix, device, name)?;
                for dst_prefix in &dst_ips {
                    let (dst_ip, dst_mask) = ip_and_mask(dst_prefix, device, name)?;
                    let port_pairs: Vec<(Option<&str>, Option<&str>)> = if !dst_ports.is_empty() {
                        if !src_ports.is_empty() {
                            dst_ports
                                .iter()
                                .flat_map(|d| src_ports.iter().map(move |s| (Some(s.as_str()), Some(d.as_str()))))
                                .collect()
                        } else {
                            dst_ports.iter().map(|d| (None, Some(d.as_str()))).collect()
                        }
                    } else if !src_ports.is_empty() {
                        src_ports.iter().map(|s| (Some(s.as_str()), None)).collect()
                    } else {
                        vec![(None, None)]
                    };
                    for (src_port, dst_port) in port_pairs {
                        let mut line = Line::new(Some(protocol.clone()), identity, ATTRIBUTES);
                        identity += 1;
                        fill_line(&mut line, &src_ip, &src_mask, &dst_ip, &dst_mask, src_port, dst_port)?;
                        block.lines.push(line);
                    }
                }
            }
        }
    }

    if let Some(block) = current.take() {
        sequence.blocks.push(block);
    }
    Ok(sequence)
}

#[derive(Default)]
struct Accumulator {
    protocols: Vec<String>,
    src_ips: Vec<String>,
    dst_ips: Vec<String>,
    src_ports: Vec<String>,
    dst_ports: Vec<String>,
}

fn process_disjuncts_conjuncts(
    entities: &[Value],
    acc: &mut Accumulator,
    device: &str,
    segment: &str,
) -> Result<()> {
    for entity in entities {
        if let Some(nested) = entity.get("disjuncts").and_then(Value::as_array) {
            process_disjuncts_conjuncts(nested, acc, device, segment)?;
        } else if let Some(nested) = entity.get("conjuncts").and_then(Value::as_array) {
            process_disjuncts_conjuncts(nested, acc, device, segment)?;
        } else if let Some(header_space) = entity.get("headerSpace") {
            update_ports(header_space, acc, device, segment)?;
            let src = src_or_dst_ips(header_space, "srcIps", device, segment)?;
            if src != ["0.0.0.0/0"] {
                acc.src_ips.extend(src);
            }
            let dst = src_or_dst_ips(header_space, "dstIps", device, segment)?;
            if dst != ["0.0.0.0/0"] {
                acc.dst_ips.extend(dst);
            }
            if let Some(protocols) = ip_protocols(header_space) {
                if !protocols.is_empty() {
                    acc.protocols = protocols;
                }
            }
        } else {
            let class = entity.get("class").and_then(Value::as_str).unwrap_or("");
            if class.contains("FalseExpr") || class.contains("TrueExpr") {
                continue;
            }
            return Err(shape_err(device, segment, format!("unhandled conjunct/disjunct entity class {class:?}")));
        }
    }
    Ok(())
}

fn update_ports(header_space: &Value, acc: &mut Accumulator, device: &str, segment: &str) -> Result<()> {
    let dst = ports(header_space, "dstPorts");
    if !dst.is_empty() {
        if !acc.dst_ports.is_empty() {
            return Err(shape_err(device, segment, "conflicting dstPorts across conjuncts"));
        }
        acc.dst_ports = dst;
    }
    let src = ports(header_space, "srcPorts");
    if !src.is_empty() {
        if !acc.src_ports.is_empty() {
            return Err(shape_err(device, segment, "conflicting srcPorts across conjuncts"));
        }
        acc.src_ports = src;
    }
    Ok(())
}

fn ip_protocols(header_space: &Value) -> Option<Vec<String>> {
    header_space
        .get("ipProtocols")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
}

fn ports(header_space: &Value, key: &str) -> Vec<String> {
    header_space
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

fn src_or_dst_ips(header_space: &Value, key: &str, device: &str, segment: &str) -> Result<Vec<String>> {
    let slot = match header_space.get(key) {
        None | Some(Value::Null) => return Ok(vec!["0.0.0.0/0".to_string()]),
        Some(slot) => slot,
    };
    let class = slot.get("class").and_then(Value::as_str).unwrap_or("");
    if class.contains("IpWildcardIpSpace") {
        Ok(vec![slot["ipWildcard"].as_str().unwrap_or_default().to_string()])
    } else if class.contains("PrefixIpSpace") {
        Ok(vec![slot["prefix"].as_str().unwrap_or_default().to_string()])
    } else if class.contains("AclIpSpace") {
        let mut ips = Vec::new();
        for entry in slot.get("lines").and_then(Value::as_array).unwrap_or(&vec![]) {
            let action = entry.get("action").and_then(Value::as_str).unwrap_or_default();
            if action != "PERMIT" {
                return Err(shape_err(device, segment, "non-PERMIT action inside AclIpSpace"));
            }
            ips.push(entry["ipSpace"]["ipWildcard"].as_str().unwrap_or_default().to_string());
        }
        Ok(ips)
    } else if class.contains("UniverseIpSpace") {
        Ok(vec!["0.0.0.0/0".to_string()])
    } else if class.contains("IpIpSpace") {
        Ok(vec![format!("{}/32", slot["ip"].as_str().unwrap_or_default())])
    } else {
        Err(shape_err(device, segment, format!("unknown {key} IpSpace class {class:?}")))
    }
}

fn ip_and_mask(prefix: &str, device: &str, segment: &str) -> Result<(String, String)> {
    if prefix == "0.0.0.0/0" {
        return Ok(("0.0.0.0".to_string(), "255.255.255.255".to_string()));
    }
    if let Some((ip, len)) = prefix.split_once('/') {
        return Ok((ip.to_string(), convert_to_mask(len)));
    }
    if let Some((ip, wildcard)) = prefix.split_once(':') {
        // Pre-expanded "ip:wildcard" notation (e.g. a discontiguous wildcard mask).
        return Ok((ip.to_string(), wildcard.to_string()));
    }
    if is_dotted_quad(prefix) {
        return Ok((prefix.to_string(), "0.0.0.0".to_string()));
    }
    Err(shape_err(device, segment, format!("unrecognized IP/mask syntax {prefix:?}")))
}

fn is_dotted_quad(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() == 4 && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Converts a prefix length to wildcard (inverse) mask notation, e.g.
/// `26 -> 0.0.0.63`.
fn convert_to_mask(len: &str) -> String {
    let Ok(value) = len.parse::<u32>() else {
        return len.to_string();
    };
    let bits: u32 = if value >= 32 { 0 } else { !0u32 >> value };
    format!(
        "{}.{}.{}.{}",
        (bits >> 24) & 0xff,
        (bits >> 16) & 0xff,
        (bits >> 8) & 0xff,
        bits & 0xff
    )
}

#[allow(clippy::too_many_arguments)]
fn fill_line(
    line: &mut Line,
    src_ip: &str,
    src_mask: &str,
    dst_ip: &str,
    dst_mask: &str,
    src_port: Option<&str>,
    dst_port: Option<&str>,
) -> Result<()> {
    let mut i = 0;
    for octet in src_ip.split('.') {
        line.set_attr(i, octet);
        i += 1;
    }
    for octet in src_mask.split('.') {
        line.set_attr(i, octet);
        i += 1;
    }
    for octet in dst_ip.split('.') {
        line.set_attr(i, octet);
        i += 1;
    }
    for octet in dst_mask.split('.') {
        line.set_attr(i, octet);
        i += 1;
    }
    match src_port.and_then(|p| p.split_once('-')) {
        Some((lo, hi)) => {
            line.set_attr(i, lo);
            line.set_attr(i + 1, hi);
        }
        None => {
            line.set_attr(i, "-1");
            line.set_attr(i + 1, "-1");
        }
    }
    i += 2;
    match dst_port.and_then(|p| p.split_once('-')) {
        Some((lo, hi)) => {
            line.set_attr(i, lo);
            line.set_attr(i + 1, hi);
        }
        None => {
            line.set_attr(i, "-1");
            line.set_attr(i + 1, "-1");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_to_mask_matches_known_value() {
        assert_eq!(convert_to_mask("26"), "0.0.0.63");
        assert_eq!(convert_to_mask("24"), "0.0.0.255");
    }

    #[test]
    fn parse_simple_acl() {
        let json = serde_json::json!({
            "lines": [{
                "action": "PERMIT",
                "matchCondition": {
                    "headerSpace": {
                        "ipProtocols": ["tcp"],
                        "srcIps": { "class": "...PrefixIpSpace", "prefix": "10.0.0.0/24" },
                        "dstIps": { "class": "...UniverseIpSpace" },
                        "srcPorts": [],
                        "dstPorts": ["80-80"]
                    }
                }
            }]
        });
        let seq = parse_acl("acl1", "r1", "cisco", &json).unwrap();
        assert_eq!(seq.blocks.len(), 1);
        assert_eq!(seq.blocks[0].lines.len(), 1);
        let line = &seq.blocks[0].lines[0];
        assert_eq!(line.tag.as_deref(), Some("tcp"));
        assert_eq!(line.attr(0), Some("10"));
        assert_eq!(line.attr(18), Some("80"));
    }
}
