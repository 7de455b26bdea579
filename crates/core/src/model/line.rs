//! Wire-level line representation shared by every segment flavor.

use serde::{Deserialize, Serialize};

/// A single wire-level line inside a [`Block`](super::Block).
///
/// The original source keys attributes by small integers, including the
/// distinguished negative indices `-1` (line identity) and `-2` (a
/// protocol/family tag). Here those become named fields: `tag` and
/// `identity`, plus a flavor-sized vector of semantic attribute slots.
/// `None` in an attribute slot means the attribute is absent for this line
/// (not merely empty) — this distinction matters for [`crate::flavor::SegmentFlavor::line_score`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// The reserved `-2` slot: a protocol or address-family tag used as a
    /// hard compatibility gate before any attribute is scored.
    pub tag: Option<String>,

    /// The reserved `-1` slot: this line's identity within the owning
    /// segment. Assigned contiguously at parse time, then renumbered by
    /// the merger and minimizer as the meta-template grows and shrinks.
    pub identity: i64,

    /// The semantic attribute slots, indexed `0..attribute_count`.
    pub attrs: Vec<Option<String>>,
}

impl Line {
    /// Create a line with all attribute slots empty.
    pub fn new(tag: Option<String>, identity: i64, attribute_count: usize) -> Self {
        Self {
            tag,
            identity,
            attrs: vec![None; attribute_count],
        }
    }

    /// Get an attribute value by index.
    pub fn attr(&self, index: usize) -> Option<&str> {
        self.attrs.get(index).and_then(|v| v.as_deref())
    }

    /// Set an attribute value by index.
    pub fn set_attr(&mut self, index: usize, value: impl Into<String>) {
        self.attrs[index] = Some(value.into());
    }

    /// Whether the value at `attrs[index]` is a parameter name (`P<k>`).
    pub fn is_parameter(&self, index: usize) -> bool {
        matches!(self.attr(index), Some(v) if v.starts_with('P') && v[1..].chars().all(|c| c.is_ascii_digit()) && v.len() > 1)
    }

    /// A hash key over every attribute except `identity`, used by the
    /// bipartite matcher's free-match shortcut. Two lines with equal keys
    /// are interchangeable without invoking the assignment solver.
    pub fn content_key(&self) -> ContentKey {
        ContentKey {
            tag: self.tag.clone(),
            attrs: self.attrs.clone(),
        }
    }
}

/// Hashable projection of a [`Line`] excluding its identity, used to find
/// free (cost-0) matches between two line sequences.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    tag: Option<String>,
    attrs: Vec<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_parameter_detects_p_names() {
        let mut line = Line::new(Some("ip".into()), 0, 2);
        line.set_attr(0, "P0");
        line.set_attr(1, "10");
        assert!(line.is_parameter(0));
        assert!(!line.is_parameter(1));
    }

    #[test]
    fn content_key_ignores_identity() {
        let mut a = Line::new(Some("ip".into()), 0, 1);
        a.set_attr(0, "10");
        let mut b = Line::new(Some("ip".into()), 7, 1);
        b.set_attr(0, "10");
        assert_eq!(a.content_key(), b.content_key());
    }
}
