//! Flavor adapters: the vendor/segment-kind-specific capability set the
//! generic aligner, matcher, merger and minimizer are built on top of.
//!
//! A flavor owns everything that differs between segment kinds: how many
//! semantic attribute slots a line has, how expensive a whole block is to
//! drop (the sequence-alignment gap penalty), how two lines are scored
//! against each other, how the JSON wire model is parsed into a
//! [`BlockSequence`], and how a finished meta-template block is rendered
//! back into vendor configuration text.
//!
//! Route-policy decomposition is an explicit non-goal: no [`SegmentFlavor`]
//! implementation is provided for it, but the trait's shape (line/block
//! abstraction, pluggable attribute count) accommodates one without
//! changing the generic engine.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Result;
use crate::model::{Block, BlockSequence};

pub mod acl;
pub mod prefix_list;

pub use acl::AclFlavor;
pub use prefix_list::PrefixListFlavor;

/// `parameter -> (value -> occurrence count)`, the view
/// [`crate::model::ParametersLinesMap::parameter_distribution`] produces.
/// Flavors consult it to tell "two different literals that happen to
/// already be the same parameter's value on some device" apart from
/// "two literals that have never been unified".
pub type ParamValueMap = HashMap<String, HashMap<String, usize>>;

/// Capability set one segment kind (ACL, prefix-list, ...) must provide
/// for the generic alignment/matching/merge/minimize pipeline.
pub trait SegmentFlavor: Send + Sync {
    /// Short identifier used in log messages and report output.
    fn name(&self) -> &'static str;

    /// Number of semantic attribute slots each [`crate::model::Line`] has.
    fn attribute_count(&self) -> usize;

    /// Per-line cost of aligning a line against a gap. A whole block's gap
    /// cost is `lines.len() * line_penalty()` — see [`block_gap_penalty`].
    fn line_penalty(&self) -> u32;

    /// Cost of matching `template_line` against `device_line`. Returns
    /// [`crate::constants::INFINITY`] when the lines are fundamentally
    /// incompatible (e.g. a protocol tag mismatch) and can never be merged.
    fn line_score(
        &self,
        template_line: &crate::model::Line,
        device_line: &crate::model::Line,
        param_value_map: &ParamValueMap,
    ) -> u32;

    /// Parse one segment's JSON body into a [`BlockSequence`].
    fn parse(&self, name: &str, device: &str, vendor_format: &str, json: &Value) -> Result<BlockSequence>;

    /// Render one finished meta-template block as vendor configuration
    /// text, one line per output row, annotated with the predicate name
    /// that governs each line's presence.
    fn format_block(
        &self,
        vendor_format: &str,
        action: crate::model::Action,
        lines: &[crate::model::Line],
        line_predicate: &HashMap<i64, String>,
        pattern: &str,
    ) -> String;
}

/// Cost of aligning `block` against a gap (dropping it entirely):
/// `lines.len() * flavor.line_penalty()`.
pub fn block_gap_penalty(flavor: &dyn SegmentFlavor, block: &Block) -> u32 {
    block.lines.len() as u32 * flavor.line_penalty()
}

/// Which top-level JSON collection a device's configuration carries for a
/// given flavor (`ipAccessLists`, `routeFilterLists`).
pub fn collection_key(flavor: &dyn SegmentFlavor) -> &'static str {
    match flavor.name() {
        "acl" => "ipAccessLists",
        "prefix-list" => "routeFilterLists",
        other => unreachable!("unknown flavor {other}"),
    }
}

/// A secondary top-level collection tried per-device only when
/// [`collection_key`]'s map doesn't contain a name matching the current
/// pattern — `route6FilterLists` mirrors `routeFilterLists` the same way
/// the original groups IPv4 and IPv6 route-filter maps under one pattern
/// scan. ACLs have no secondary collection.
pub fn secondary_collection_key(flavor: &dyn SegmentFlavor) -> Option<&'static str> {
    match flavor.name() {
        "prefix-list" => Some("route6FilterLists"),
        _ => None,
    }
}
