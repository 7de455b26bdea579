//! Generalization driver: the frequency-seeded pairwise-merge loop that
//! turns every device's segment matching one name pattern into a single
//! meta-template, then hands off to the minimizer and outlier reporter.

use indexmap::IndexMap;
use serde_json::Value;

use crate::align::align_sequences;
use crate::constants::OutlierThresholds;
use crate::error::Result;
use crate::flavor::SegmentFlavor;
use crate::ingest::{self, ExactEquivalence};
use crate::merge::generate_template;
use crate::minimize::minimize_parameters;
use crate::model::{BlockSequence, ParametersLinesMap, TEMPLATE_SENTINEL};
use crate::report::{self, PatternReport};
use crate::worker::ProgressMonitor;

/// Outcome of running one pattern's generalization to completion, before
/// any differences (if any) are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consistency {
    /// No non-empty segment matched the pattern on any device.
    NotFound,
    /// Every matching segment was an exact duplicate of the first one
    /// seen; no merge ever ran.
    ExactConsistency,
    /// Merges ran but produced zero parameters — every device's segment
    /// was the same modulo line reordering.
    ReorderConsistency,
    /// Merges ran, zero parameters were needed after minimization, and no
    /// reordering occurred either.
    Consistent,
    /// The meta-template needed parameters and/or more than one device
    /// group — see the accompanying [`PatternReport`].
    Inconsistent,
}

pub struct DriverResult {
    pub consistency: Consistency,
    /// Exact-equivalence group sizes (including the representative),
    /// sorted descending — compared against discovered groups to sanity
    /// check the minimizer's output.
    pub exact_group_sizes: Vec<usize>,
    pub report: Option<PatternReport>,
}

/// Run the full generalization pipeline for one segment-name pattern
/// against every device in `devices_info`, flagging outliers against
/// `thresholds` (pass [`OutlierThresholds::default`] to use the built-in
/// defaults).
pub fn run_pattern(
    flavor: &dyn SegmentFlavor,
    pattern_string: &str,
    devices_info: &IndexMap<String, Value>,
    monitor: &dyn ProgressMonitor,
    thresholds: &OutlierThresholds,
) -> Result<DriverResult> {
    let pattern = ingest::anchored_pattern(pattern_string)?;
    let mut found_devices = indexmap::IndexSet::new();
    let mut empty_def_devices = indexmap::IndexSet::new();
    let mut exact_match = ExactEquivalence::new();

    let found = ingest::collect_segments(
        flavor,
        devices_info,
        &pattern,
        &mut found_devices,
        &mut empty_def_devices,
        &mut exact_match,
    )?;

    let mut buckets: IndexMap<i64, Vec<BlockSequence>> = IndexMap::new();
    for segment in found {
        buckets.entry(segment.line_count).or_default().push(segment.sequence);
    }

    let mut order: Vec<(usize, i64)> = buckets.iter().map(|(&count, segs)| (segs.len(), count)).collect();
    order.sort_by(|a, b| b.cmp(a));

    let total: u64 = order.iter().map(|&(count, _)| count as u64).sum();
    monitor.set_total(total);
    let mut done = 0u64;

    let mut meta_template: Option<BlockSequence> = None;
    let mut parameters_lines: Option<ParametersLinesMap> = None;
    let mut templating_count = 0usize;

    for (_, line_count) in order {
        let segments = buckets.swap_remove(&line_count).unwrap_or_default();
        for segment in segments {
            if !monitor.keep_going() {
                return Err(crate::worker::CancelledError.into());
            }
            match parameters_lines.as_mut() {
                None => {
                    let device = segment.device_name.clone();
                    let mut template = segment;
                    let lines = (0..=line_count).collect();
                    template.device_name = TEMPLATE_SENTINEL.to_string();
                    meta_template = Some(template);
                    parameters_lines = Some(ParametersLinesMap::new(device, lines));
                }
                Some(params) => {
                    let device = segment.device_name.clone();
                    params.parameters.insert(device.clone(), indexmap::IndexMap::new());
                    let param_value_map = params.parameter_distribution();
                    let template = meta_template.as_ref().expect("template initialized before second segment");
                    let columns = align_sequences(flavor, template, &segment, &param_value_map);
                    let new_blocks = generate_template(flavor, columns, params, &device);
                    meta_template.as_mut().unwrap().blocks = new_blocks;
                    templating_count += 1;
                }
            }
            done += 1;
            monitor.update_with_phase(done, pattern_string);
        }
    }

    let Some(mut meta_template) = meta_template else {
        return Ok(DriverResult {
            consistency: Consistency::NotFound,
            exact_group_sizes: Vec::new(),
            report: None,
        });
    };
    let mut parameters_lines = parameters_lines.expect("set alongside meta_template");

    minimize_parameters(flavor, &mut meta_template, &mut parameters_lines);
    let exact_group_sizes = parameters_lines.add_exact_routers(&exact_match.into_map());

    let mut report =
        report::build_report(flavor, &meta_template, &mut parameters_lines, pattern_string, thresholds);
    if let Some(report) = report.as_mut() {
        report.exact_equivalence.exact_group_sizes = exact_group_sizes.clone();
        report.exact_equivalence.discovered_group_sizes =
            report.groups.iter().map(|g| g.devices.len()).collect();
    }

    let consistency = if report.is_some() {
        Consistency::Inconsistent
    } else if templating_count == 0 {
        Consistency::ExactConsistency
    } else if parameters_lines.counter == 0 {
        Consistency::ReorderConsistency
    } else {
        Consistency::Consistent
    };

    Ok(DriverResult {
        consistency,
        exact_group_sizes,
        report,
    })
}
