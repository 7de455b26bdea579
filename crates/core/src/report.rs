//! Report model: the structured result of templating one pattern,
//! rendered to text (the meta-template) and to JSON (everything else —
//! groups, the parameter table, outlier questions).
//!
//! Producing an HTML page with Plotly-colored predicate cells (as the
//! original tool did) stays out of scope; the CLI instead writes this
//! struct as text plus JSON, which carries the same information.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::constants::OutlierThresholds;
use crate::flavor::SegmentFlavor;
use crate::model::{BlockSequence, ParametersLinesMap};

/// Exact-equivalence group sizes discovered by deduplicating structurally
/// identical device segments before templating even started, compared
/// against the groups the minimizer later re-discovers from predicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExactComparison {
    pub exact_group_sizes: Vec<usize>,
    pub discovered_group_sizes: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReport {
    pub index: usize,
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternReport {
    pub pattern: String,
    pub flavor: String,
    pub meta_template_text: String,
    pub groups: Vec<GroupReport>,
    pub parameter_table: Vec<BTreeMap<String, String>>,
    pub single_param_outliers: Vec<String>,
    pub spurious_param_outliers: Vec<String>,
    pub exact_equivalence: ExactComparison,
}

/// Render the finished, minimized meta-template and its bookkeeping into
/// a [`PatternReport`]. Returns `None` when the pattern turned out fully
/// consistent: at most one device group and no outlier questions — there
/// is nothing to report.
pub fn build_report(
    flavor: &dyn SegmentFlavor,
    meta_template: &BlockSequence,
    parameters_lines: &mut ParametersLinesMap,
    pattern: &str,
    thresholds: &OutlierThresholds,
) -> Option<PatternReport> {
    let predicates = parameters_lines.predicates.clone().unwrap_or_default();
    let mut line_predicate: HashMap<i64, String> = HashMap::new();
    for (name, lines) in &predicates {
        for &line in lines {
            line_predicate.insert(line, name.clone());
        }
    }

    let mut meta_template_text = String::new();
    for block in &meta_template.blocks {
        meta_template_text.push_str(&flavor.format_block(
            &meta_template.vendor_format,
            block.action,
            &block.lines,
            &line_predicate,
            pattern,
        ));
    }

    let (meta_template_text, parameter_table) = parameters_lines.format_groups(&meta_template_text);
    let single_param_outliers = parameters_lines.single_param_questions(thresholds.single_param);
    let spurious_param_outliers = parameters_lines.spurious_param_questions(thresholds.spurious_param);

    let groups_list = parameters_lines.groups_list.clone().unwrap_or_default();
    if groups_list.len() <= 1 && single_param_outliers.is_empty() && spurious_param_outliers.is_empty() {
        return None;
    }

    let mut groups: Vec<GroupReport> = groups_list
        .iter()
        .enumerate()
        .map(|(index, (_, devices))| {
            let mut devices: Vec<String> = devices.iter().cloned().collect();
            devices.sort();
            GroupReport { index, devices }
        })
        .collect();
    groups.sort_by_key(|g| std::cmp::Reverse(g.devices.len()));

    Some(PatternReport {
        pattern: pattern.to_string(),
        flavor: flavor.name().to_string(),
        meta_template_text,
        groups,
        parameter_table,
        single_param_outliers,
        spurious_param_outliers,
        exact_equivalence: ExactComparison::default(),
    })
}
