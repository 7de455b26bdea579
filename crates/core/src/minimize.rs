//! Parameter minimizer: prunes parameters no longer reachable from the
//! meta-template (because the lines that used them were gapped out in a
//! later merge), coalesces groups of parameters that happen to always
//! agree, and (re)builds predicates and group numbering from the final
//! line mapping.

use std::collections::{HashMap, HashSet};

use crate::flavor::SegmentFlavor;
use crate::model::{modify_erase, remap_parameters, BlockSequence, ParametersLinesMap};

pub fn minimize_parameters(
    flavor: &dyn SegmentFlavor,
    meta_template: &mut BlockSequence,
    parameters_lines: &mut ParametersLinesMap,
) {
    let mut line_param_map: HashMap<i64, HashSet<String>> = HashMap::new();
    for block in &meta_template.blocks {
        for line in &block.lines {
            for attr in 0..flavor.attribute_count() {
                if let Some(v) = line.attr(attr) {
                    if v.starts_with('P') {
                        line_param_map.entry(line.identity).or_default().insert(v.to_string());
                    }
                }
            }
        }
    }

    let devices: Vec<String> = parameters_lines.line_mapping.keys().cloned().collect();
    for device in devices {
        let mut my_params: HashSet<String> = HashSet::new();
        for line in &parameters_lines.line_mapping[&device] {
            if let Some(params) = line_param_map.get(line) {
                my_params.extend(params.iter().cloned());
            }
        }
        if let Some(values) = parameters_lines.parameters.get_mut(&device) {
            let extra: Vec<String> = values.keys().filter(|k| !my_params.contains(*k)).cloned().collect();
            for param in extra {
                values.shift_remove(&param);
            }
        }
    }

    for group in parameters_lines.common_value_params() {
        modify_erase(meta_template, parameters_lines, &group[0], &group[1..]);
    }

    let total_lines = meta_template.last_line_identity().unwrap_or(-1);
    parameters_lines.predicate_generator(total_lines);
    parameters_lines.group_and_sort_predicates(meta_template);
    remap_parameters(meta_template, parameters_lines);
}
