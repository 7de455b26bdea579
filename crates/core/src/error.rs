//! Unified error types for the tmplminer-core crate.
//!
//! All public-facing errors are collected here so callers can match on a
//! single enum.

use thiserror::Error;

/// Top-level error type for the tmplminer-core crate.
#[derive(Error, Debug)]
pub enum MinerError {
    /// An I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error reading a device model.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A device's segment JSON did not match any recognized shape for the
    /// flavor being ingested (unknown `IpSpace` class, malformed match
    /// condition, malformed wildcard/mask literal).
    #[error("unrecognized JSON shape in segment {segment:?} on device {device:?}: {reason}")]
    UnrecognizedShape {
        device: String,
        segment: String,
        reason: String,
    },

    /// A structural invariant was violated inside the alignment/merge
    /// pipeline (mismatched alignment lengths, undefined traceback
    /// pointer). This indicates a programming error rather than bad input.
    #[error("alignment invariant violated: {0}")]
    Alignment(String),

    /// An invalid segment-name pattern was supplied.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The caller's [`crate::worker::ProgressMonitor`] requested
    /// cancellation mid-run.
    #[error("operation cancelled: {0}")]
    Cancelled(#[from] crate::worker::CancelledError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MinerError>;
