//! Segment (block sequence): one named configuration construct on one device.

use serde::{Deserialize, Serialize};

use super::Block;

/// Device name used for the meta-template once templating begins.
pub const TEMPLATE_SENTINEL: &str = "Template";

/// One named configuration segment (ACL, prefix-list, ...) found on one
/// device, decomposed into same-action [`Block`]s.
///
/// Invariant: consecutive blocks have distinct actions. Segments are
/// immutable once parsed; the meta-template is a deep copy mutated only by
/// the merger and minimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSequence {
    pub name: String,
    pub device_name: String,
    pub vendor_format: String,
    pub blocks: Vec<Block>,
}

impl BlockSequence {
    pub fn new(name: impl Into<String>, device_name: impl Into<String>, vendor_format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device_name: device_name.into(),
            vendor_format: vendor_format.into(),
            blocks: Vec::new(),
        }
    }

    /// Whether this segment has no lines at all (an empty definition).
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() || self.blocks.iter().all(|b| b.lines.is_empty())
    }

    /// The identity of the last line in the segment, i.e. `total_lines - 1`.
    /// `None` for an empty segment.
    pub fn last_line_identity(&self) -> Option<i64> {
        self.blocks
            .iter()
            .rev()
            .find_map(|b| b.lines.last())
            .map(|l| l.identity)
    }
}
