//! Template merger: folds one aligned device segment into the running
//! meta-template, allocating parameters wherever an aligned line pair
//! disagrees.

use std::collections::HashMap;

use crate::align::AlignedColumn;
use crate::flavor::{ParamValueMap, SegmentFlavor};
use crate::model::{Block, Line, ParametersLinesMap};

/// Fold `columns` (the alignment of the running meta-template against one
/// device's segment) into a new block list, mutating `parameters_lines`
/// with the device's parameter values and line mapping.
pub fn generate_template(
    flavor: &dyn SegmentFlavor,
    columns: Vec<AlignedColumn>,
    parameters_lines: &mut ParametersLinesMap,
    device: &str,
) -> Vec<Block> {
    let param_value_map = parameters_lines.parameter_distribution();
    let mut merged_blocks = Vec::with_capacity(columns.len());
    let mut line_num = 0i64;
    let mut old_to_new: HashMap<i64, i64> = HashMap::new();
    let mut new_device_lines: Vec<i64> = Vec::new();

    for column in columns {
        match column {
            AlignedColumn::GapInFirst(block2) => {
                let mut block = block2.clone();
                for line in block.lines.iter_mut() {
                    new_device_lines.push(line_num);
                    line.identity = line_num;
                    line_num += 1;
                }
                merged_blocks.push(block);
            }
            AlignedColumn::GapInSecond(block1) => {
                let mut block = block1.clone();
                for line in block.lines.iter_mut() {
                    old_to_new.insert(line.identity, line_num);
                    line.identity = line_num;
                    line_num += 1;
                }
                merged_blocks.push(block);
            }
            AlignedColumn::Matched(block1, block2, matching) => {
                let mut block = block1.clone();
                let (lines, next_line_num) = merge_lines(
                    flavor,
                    &block1.lines,
                    &block2.lines,
                    line_num,
                    parameters_lines,
                    &param_value_map,
                    &matching,
                    &mut old_to_new,
                    &mut new_device_lines,
                    device,
                );
                block.lines = lines;
                line_num = next_line_num;
                merged_blocks.push(block);
            }
        }
    }

    parameters_lines.remap_line_numbers(&old_to_new);
    parameters_lines.line_mapping.insert(device.to_string(), new_device_lines);
    merged_blocks
}

#[allow(clippy::too_many_arguments)]
fn merge_lines(
    flavor: &dyn SegmentFlavor,
    template_lines: &[Line],
    device_lines: &[Line],
    mut line_num: i64,
    parameters_lines: &mut ParametersLinesMap,
    param_value_map: &ParamValueMap,
    matching: &[(usize, usize)],
    old_to_new: &mut HashMap<i64, i64>,
    new_device_lines: &mut Vec<i64>,
    device: &str,
) -> (Vec<Line>, i64) {
    let matched_template: std::collections::HashSet<usize> = matching.iter().map(|&(i, _)| i).collect();
    let matched_device: std::collections::HashSet<usize> = matching.iter().map(|&(_, j)| j).collect();

    let mut combined = Vec::new();

    for (i, line) in template_lines.iter().enumerate() {
        if !matched_template.contains(&i) {
            let mut line = line.clone();
            old_to_new.insert(line.identity, line_num);
            line.identity = line_num;
            line_num += 1;
            combined.push(line);
        }
    }

    for (j, line) in device_lines.iter().enumerate() {
        if !matched_device.contains(&j) {
            let mut line = line.clone();
            line.identity = line_num;
            new_device_lines.push(line_num);
            line_num += 1;
            combined.push(line);
        }
    }

    for &(i, j) in matching {
        let template_line = &template_lines[i];
        let device_line = &device_lines[j];
        let mut line = template_line.clone();

        for attr in 0..flavor.attribute_count() {
            match (template_line.attr(attr), device_line.attr(attr)) {
                (Some(t), Some(d)) if t != d => {
                    if !param_value_map.contains_key(t) {
                        let param = format!("P{}", parameters_lines.counter);
                        parameters_lines.counter += 1;
                        parameters_lines
                            .parameters
                            .entry(device.to_string())
                            .or_default()
                            .insert(param.clone(), d.to_string());
                        parameters_lines.add_parameter(&param, t, device);
                        line.set_attr(attr, param);
                    } else {
                        parameters_lines
                            .parameters
                            .entry(device.to_string())
                            .or_default()
                            .insert(t.to_string(), d.to_string());
                    }
                }
                (None, Some(d)) => {
                    let param = format!("P{}", parameters_lines.counter);
                    parameters_lines.counter += 1;
                    parameters_lines
                        .parameters
                        .entry(device.to_string())
                        .or_default()
                        .insert(param.clone(), d.to_string());
                    parameters_lines.add_parameter(&param, "", device);
                    line.set_attr(attr, param);
                }
                _ => {}
            }
        }

        old_to_new.insert(line.identity, line_num);
        line.identity = line_num;
        new_device_lines.push(line_num);
        line_num += 1;
        combined.push(line);
    }

    (combined, line_num)
}
