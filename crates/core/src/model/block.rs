//! Block: a maximal same-action run of lines within a segment.

use serde::{Deserialize, Serialize};

use super::Line;

/// The action shared by every line in a [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Permit,
    Deny,
}

impl Action {
    /// Parse an action token from the upstream JSON model (`"PERMIT"` /
    /// `"DENY"`, case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "PERMIT" => Some(Action::Permit),
            "DENY" => Some(Action::Deny),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Permit => "permit",
            Action::Deny => "deny",
        }
    }
}

/// A maximal run of lines sharing one [`Action`].
///
/// Consecutive blocks in a [`crate::model::BlockSequence`] always have
/// distinct actions — runs of equal action are merged at parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub action: Action,
    pub lines: Vec<Line>,
}

impl Block {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            lines: Vec::new(),
        }
    }
}
