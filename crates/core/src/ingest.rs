//! Ingestion layer: turns the already-parsed per-device JSON model into
//! the [`BlockSequence`]s the generalization driver merges, handling
//! `device#segmentName` disambiguation, empty-definition tracking, and
//! the exact-equivalence fast path that skips templating devices whose
//! segment body is byte-for-byte identical to one already seen.

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde_json::Value;

use crate::error::{MinerError, Result};
use crate::flavor::{collection_key, secondary_collection_key, SegmentFlavor};
use crate::model::BlockSequence;

/// Compile `pattern` anchored at the start of the segment name, mirroring
/// Python's `re.match` (matches a prefix, not necessarily the whole
/// string — unlike `Regex::is_match`, which matches anywhere).
pub fn anchored_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| MinerError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Tracks segments seen so far for one pattern, deduplicating devices
/// whose segment body is structurally identical (JSON equality, ignoring
/// key order) to an already-recorded representative.
#[derive(Default)]
pub struct ExactEquivalence {
    entries: IndexMap<String, (IndexSet<String>, Value)>,
}

impl ExactEquivalence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and records `router` under an existing
    /// representative if `new_json` matches one structurally; otherwise
    /// records `router` as a fresh representative and returns `false`.
    pub fn check(&mut self, new_json: &Value, router: &str) -> bool {
        for (_, (equivalents, existing)) in self.entries.iter_mut() {
            if existing == new_json {
                equivalents.insert(router.to_string());
                return true;
            }
        }
        self.entries.insert(router.to_string(), (IndexSet::new(), new_json.clone()));
        false
    }

    pub fn into_map(self) -> IndexMap<String, IndexSet<String>> {
        self.entries.into_iter().map(|(k, (v, _))| (k, v)).collect()
    }
}

/// One non-empty, non-exact-duplicate segment found across the fleet for
/// one pattern, tagged with its line count (used to bucket segments by
/// size before merging — see [`crate::driver`]).
pub struct FoundSegment {
    pub line_count: i64,
    pub sequence: BlockSequence,
}

/// Picks the segment-name map to scan on one device: the primary
/// collection if it has a name matching `pattern`, otherwise the
/// secondary collection (if the flavor has one and it has a match),
/// otherwise the primary collection again (so a no-match device still
/// falls through the caller's loop the same way it always did).
fn select_collection<'a>(
    device_json: &'a Value,
    primary_key: &str,
    secondary_key: Option<&str>,
    pattern: &Regex,
) -> Option<&'a serde_json::Map<String, Value>> {
    let primary = device_json.get(primary_key).and_then(Value::as_object);
    if primary.is_some_and(|segments| segments.keys().any(|name| pattern.is_match(name))) {
        return primary;
    }
    if let Some(secondary_key) = secondary_key {
        let secondary = device_json.get(secondary_key).and_then(Value::as_object);
        if secondary.is_some_and(|segments| segments.keys().any(|name| pattern.is_match(name))) {
            return secondary;
        }
    }
    primary
}

/// Scan every device for segments matching `pattern`, parse them with
/// `flavor`, and partition the results into templatable segments
/// (returned), devices with an empty definition (`empty_def_devices`),
/// and the running exact-equivalence bookkeeping (`exact_match`).
///
/// `found_devices` accumulates every device (or `device#segment`
/// disambiguated name) that has at least one matching, non-empty segment
/// — on a second match for the same bare device name, the segment is
/// renamed `device#segmentName` to keep it distinct.
pub fn collect_segments(
    flavor: &dyn SegmentFlavor,
    devices_info: &IndexMap<String, Value>,
    pattern: &Regex,
    found_devices: &mut IndexSet<String>,
    empty_def_devices: &mut IndexSet<String>,
    exact_match: &mut ExactEquivalence,
) -> Result<Vec<FoundSegment>> {
    let key = collection_key(flavor);
    let secondary_key = secondary_collection_key(flavor);
    let mut found = Vec::new();

    for (device, device_json) in devices_info {
        let Some(segments) = select_collection(device_json, key, secondary_key, pattern) else {
            continue;
        };
        let vendor_format = device_json
            .get("configurationFormat")
            .and_then(Value::as_str)
            .unwrap_or_default();

        for (segment_name, segment_json) in segments {
            if !pattern.is_match(segment_name) {
                continue;
            }
            let rname = if found_devices.contains(device) {
                format!("{device}#{segment_name}")
            } else {
                device.clone()
            };

            let sequence = flavor.parse(segment_name, &rname, vendor_format, segment_json)?;
            if sequence.is_empty() {
                empty_def_devices.insert(rname);
                continue;
            }
            found_devices.insert(rname.clone());

            if !exact_match.check(segment_json, &rname) {
                let line_count = sequence.last_line_identity().unwrap_or(-1);
                found.push(FoundSegment { line_count, sequence });
            }
        }
    }

    Ok(found)
}
