//! Shared tuning constants, ported from the original per-flavor module
//! globals and the outlier-reporting thresholds in the driver.

/// Sentinel score meaning "these two lines cannot be matched at any cost"
/// (e.g. mismatched protocol tag). Large enough that no real accumulated
/// attribute mismatch score reaches it.
pub const INFINITY: u32 = 10_000;

/// Per-line gap penalty for the ACL flavor.
pub const LINE_PENALTY_ACL: u32 = 40;

/// Per-line gap penalty for the prefix-list flavor.
pub const LINE_PENALTY_PREFIX: u32 = 14;

/// A parameter value occurring in fewer than this fraction of the devices
/// that define the parameter's average value frequency is flagged as a
/// single-parameter outlier.
pub const SINGLE_PARAM_THRESHOLD: f64 = 0.09;

/// Two co-defined parameters disagreeing on fewer than this fraction of
/// the devices that define both are flagged as a spurious-parameter-pair
/// outlier.
pub const SPURIOUS_PARAM_THRESHOLD: f64 = 0.05;

/// The two outlier-detection thresholds [`report::build_report`](crate::report::build_report)
/// consults, overridable by a caller's config file (see the CLI's
/// `MinerConfig`) instead of always using the defaults above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierThresholds {
    pub single_param: f64,
    pub spurious_param: f64,
}

impl Default for OutlierThresholds {
    fn default() -> Self {
        Self {
            single_param: SINGLE_PARAM_THRESHOLD,
            spurious_param: SPURIOUS_PARAM_THRESHOLD,
        }
    }
}
