//! # tmplminer-core
//!
//! Mines fleets of network-device configurations (ACLs, IP prefix-lists)
//! to discover parameterized templates: one meta-template per segment
//! name pattern, plus the device groups and outlier questions that
//! explain where devices disagree.
//!
//! The pipeline, in order: [`ingest`] turns per-device JSON into
//! [`model::BlockSequence`]s, [`align`] and [`matching`] find the
//! cheapest way to fold one device's segment into the running
//! meta-template, [`merge`] performs that fold (allocating parameters on
//! disagreement), [`minimize`] prunes and coalesces parameters once every
//! device has been merged in, and [`report`] renders the result.
//! [`driver`] strings all of it together per pattern.

pub mod align;
pub mod constants;
pub mod driver;
pub mod error;
pub mod flavor;
pub mod ingest;
pub mod matching;
pub mod merge;
pub mod minimize;
pub mod model;
pub mod report;
pub mod worker;

pub use constants::OutlierThresholds;
pub use driver::{run_pattern, Consistency, DriverResult};
pub use error::{MinerError, Result};
pub use flavor::{AclFlavor, PrefixListFlavor, SegmentFlavor};
pub use report::PatternReport;
pub use worker::{CancelledError, LoopReporter, NoopMonitor, ProgressMonitor};
