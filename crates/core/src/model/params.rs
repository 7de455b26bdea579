//! `ParametersLinesMap`: the bookkeeping shared across one pattern's merge
//! run — per-device parameter values, per-device line presence, and (once
//! the minimizer has run) predicates and device groups.

use std::collections::{BTreeMap, HashMap};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::BlockSequence;

/// The always-true predicate: every device that contributes to the
/// meta-template at all has these lines.
pub const ALWAYS_TRUE_PREDICATE: &str = "A";

/// Per-device parameter values and line presence, plus the predicates and
/// groups the minimizer derives from them.
///
/// Devices are keyed in discovery order (an [`IndexMap`]) because several
/// downstream computations — predicate numbering, group discovery order,
/// tie-breaking in [`ParametersLinesMap::common_value_params`] — are
/// defined in terms of "order first seen", mirroring the original's use of
/// insertion-ordered dictionaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParametersLinesMap {
    /// Next parameter index to allocate (`P<counter>`).
    pub counter: usize,
    /// `device -> (paramName -> value)`.
    pub parameters: IndexMap<String, IndexMap<String, String>>,
    /// `device -> sorted line identities the device contributes`.
    pub line_mapping: IndexMap<String, Vec<i64>>,
    /// `predicateName -> line identities`, populated by the minimizer.
    pub predicates: Option<IndexMap<String, Vec<i64>>>,
    /// `(linesPresent, deviceSet)` per group, populated by the minimizer.
    pub groups_list: Option<Vec<(Vec<i64>, IndexSet<String>)>>,
}

impl ParametersLinesMap {
    pub fn new(device: impl Into<String>, lines: Vec<i64>) -> Self {
        let device = device.into();
        let mut parameters = IndexMap::new();
        parameters.insert(device.clone(), IndexMap::new());
        let mut line_mapping = IndexMap::new();
        line_mapping.insert(device, lines);
        Self {
            counter: 0,
            parameters,
            line_mapping,
            predicates: None,
            groups_list: None,
        }
    }

    /// `P -> {value -> occurrence count}` recomputed on demand from
    /// `parameters`, rather than kept incrementally — this avoids
    /// invalidation cycles when parameters are coalesced or pruned.
    pub fn parameter_distribution(&self) -> HashMap<String, HashMap<String, usize>> {
        let mut dist: HashMap<String, HashMap<String, usize>> = HashMap::new();
        for values in self.parameters.values() {
            for (param, value) in values {
                *dist
                    .entry(param.clone())
                    .or_default()
                    .entry(value.clone())
                    .or_insert(0) += 1;
            }
        }
        dist
    }

    /// Record `value` for `param` on every device except `new_device`
    /// (used when a fresh parameter is allocated: every *other* device is
    /// retroactively assigned the literal the template used to hold, or
    /// the empty string when the template lacked the attribute).
    pub fn add_parameter(&mut self, param: &str, value: &str, new_device: &str) {
        for (device, values) in self.parameters.iter_mut() {
            if device != new_device {
                values.insert(param.to_string(), value.to_string());
            }
        }
    }

    /// Rewrite every device's `line_mapping` through `old_to_new`, leaving
    /// identities absent from the map unchanged.
    pub fn remap_line_numbers(&mut self, old_to_new: &HashMap<i64, i64>) {
        for lines in self.line_mapping.values_mut() {
            for line in lines.iter_mut() {
                if let Some(&new) = old_to_new.get(line) {
                    *line = new;
                }
            }
        }
    }

    /// For every pair of parameters `(Pi, Pj)`, the number of devices
    /// where both are defined and equal. An entry is removed the moment
    /// any device has both defined but disagreeing.
    pub fn param_compatible_sets(&self) -> IndexMap<String, IndexMap<String, usize>> {
        let max_param = self.counter;
        let mut compatible: IndexMap<String, IndexMap<String, usize>> = IndexMap::new();
        for i in 0..max_param {
            let present = format!("P{i}");
            let mut row = IndexMap::new();
            for j in 0..max_param {
                if i != j {
                    row.insert(format!("P{j}"), 0usize);
                }
            }
            compatible.insert(present, row);
        }
        for values in self.parameters.values() {
            for (present, row) in compatible.iter_mut() {
                if let Some(present_value) = values.get(present) {
                    for (param, value) in values {
                        if param == present {
                            continue;
                        }
                        if row.contains_key(param) {
                            if value == present_value {
                                *row.get_mut(param).unwrap() += 1;
                            } else {
                                row.shift_remove(param);
                            }
                        }
                    }
                }
            }
        }
        compatible
    }

    /// Maximal groups of parameters that agree on every device where more
    /// than one of them is defined. Built greedily: sort candidates by
    /// descending co-value count, add a candidate only if it is still
    /// compatible with every member already chosen.
    pub fn common_value_params(&self) -> Vec<Vec<String>> {
        let compatible = self.param_compatible_sets();
        let mut done: IndexSet<String> = IndexSet::new();
        let mut common = Vec::new();
        for param in compatible.keys() {
            if done.contains(param) {
                continue;
            }
            done.insert(param.clone());
            let mut group = vec![param.clone()];
            let mut candidates: Vec<(&String, &usize)> = compatible[param].iter().collect();
            candidates.sort_by(|a, b| b.1.cmp(a.1));
            for (candidate, &count) in candidates {
                if count == 0 {
                    continue;
                }
                if done.contains(candidate) {
                    continue;
                }
                let compatible_with_all = group.iter().all(|member| {
                    member == candidate || compatible[candidate].contains_key(member)
                });
                if compatible_with_all {
                    group.push(candidate.clone());
                    done.insert(candidate.clone());
                }
            }
            if group.len() > 1 {
                common.push(group);
            }
        }
        common
    }

    /// Build predicates and groups from the current `line_mapping`.
    ///
    /// A group is the set of devices sharing an identical sorted list of
    /// present line identities. A predicate is the equivalence class of
    /// line identities sharing an identical bitmap of "is this line
    /// present in group g" across all groups (ordered by first
    /// appearance); the all-true bitmap is named `A`, the rest `R0, R1, ...`
    /// in discovery order.
    pub fn predicate_generator(&mut self, total_lines: i64) {
        let mut groups: Vec<(Vec<i64>, IndexSet<String>)> = Vec::new();
        for (device, lines) in self.line_mapping.iter() {
            let mut sorted = lines.clone();
            sorted.sort_unstable();
            if let Some((_, devices)) = groups.iter_mut().find(|(l, _)| *l == sorted) {
                devices.insert(device.clone());
            } else {
                let mut devices = IndexSet::new();
                devices.insert(device.clone());
                groups.push((sorted, devices));
            }
        }

        let mut bitmaps: Vec<Vec<u8>> = vec![Vec::with_capacity(groups.len()); (total_lines + 1) as usize];
        for (lines_present, _) in &groups {
            let present: IndexSet<i64> = lines_present.iter().copied().collect();
            for line in 0..=total_lines {
                bitmaps[line as usize].push(if present.contains(&line) { 1 } else { 0 });
            }
        }

        let mut same_truth_table: Vec<(Vec<u8>, Vec<i64>)> = Vec::new();
        for line in 0..=total_lines {
            let bitmap = &bitmaps[line as usize];
            if let Some((_, lines)) = same_truth_table.iter_mut().find(|(b, _)| b == bitmap) {
                lines.push(line);
            } else {
                same_truth_table.push((bitmap.clone(), vec![line]));
            }
        }

        let all_true = vec![1u8; groups.len()];
        let mut predicates = IndexMap::new();
        let mut counter = 0;
        for (bitmap, lines) in same_truth_table {
            if bitmap == all_true {
                predicates.insert(ALWAYS_TRUE_PREDICATE.to_string(), lines);
            } else {
                predicates.insert(format!("R{counter}"), lines);
                counter += 1;
            }
        }

        self.predicates = Some(predicates);
        self.groups_list = Some(groups);
    }

    /// Sort lines within each block by predicate name (`A` before `R*`,
    /// lexicographic thereafter), preserving original order within a
    /// predicate, then renumber contiguously and propagate through
    /// predicates/line_mapping/groups_list.
    pub fn group_and_sort_predicates(&mut self, meta_template: &mut BlockSequence) {
        let predicates = self.predicates.clone().unwrap_or_default();
        let mut line_predicate: HashMap<i64, &str> = HashMap::new();
        for (predicate, lines) in &predicates {
            for &line in lines {
                line_predicate.insert(line, predicate.as_str());
            }
        }

        let mut seq = 0i64;
        let mut old_to_new: HashMap<i64, i64> = HashMap::new();
        for block in meta_template.blocks.iter_mut() {
            let mut order: Vec<usize> = (0..block.lines.len()).collect();
            order.sort_by(|&a, &b| {
                let pa = line_predicate.get(&block.lines[a].identity).copied().unwrap_or("");
                let pb = line_predicate.get(&block.lines[b].identity).copied().unwrap_or("");
                pa.cmp(pb).then(a.cmp(&b))
            });
            let mut reordered = Vec::with_capacity(block.lines.len());
            for idx in order {
                let mut line = block.lines[idx].clone();
                old_to_new.insert(line.identity, seq);
                line.identity = seq;
                seq += 1;
                reordered.push(line);
            }
            block.lines = reordered;
        }

        self.remap_line_numbers(&old_to_new);

        let mut new_predicates = IndexMap::new();
        for (predicate, lines) in &predicates {
            new_predicates.insert(
                predicate.clone(),
                lines.iter().map(|l| old_to_new[l]).collect(),
            );
        }
        self.predicates = Some(new_predicates);

        if let Some(groups) = self.groups_list.take() {
            let remapped = groups
                .into_iter()
                .map(|(lines, devices)| (lines.into_iter().map(|l| old_to_new[&l]).collect(), devices))
                .collect();
            self.groups_list = Some(remapped);
        }
    }

    /// Fold exact-equivalent devices into the group/line-mapping/parameters
    /// of the representative device they matched. Returns each
    /// representative's exact-equivalence group size (including itself),
    /// sorted descending, for comparison against the discovered groups.
    pub fn add_exact_routers(&mut self, exact_map: &IndexMap<String, IndexSet<String>>) -> Vec<usize> {
        let mut group_sizes = Vec::new();
        let groups = self.groups_list.as_mut().expect("predicates must be generated first");
        for (device, equivalents) in exact_map {
            group_sizes.push(equivalents.len() + 1);
            if let Some((_, devices)) = groups.iter_mut().find(|(_, devices)| devices.contains(device)) {
                for equiv in equivalents {
                    devices.insert(equiv.clone());
                }
            }
            let mapping = self.line_mapping.get(device).cloned().unwrap_or_default();
            let params = self.parameters.get(device).cloned().unwrap_or_default();
            for equiv in equivalents {
                self.line_mapping.insert(equiv.clone(), mapping.clone());
                self.parameters.insert(equiv.clone(), params.clone());
            }
        }
        group_sizes.sort_unstable_by(|a, b| b.cmp(a));
        group_sizes
    }

    /// Render the group listing (one `Group N:` header per discovered
    /// group, predicate true/false flags, member devices) appended to
    /// `meta_template_text`, and the per-device parameter table rows
    /// (`"Router"` plus one column per parameter) used for the CSV-style
    /// report.
    pub fn format_groups(&mut self, meta_template_text: &str) -> (String, Vec<BTreeMap<String, String>>) {
        let mut groups = self.groups_list.clone().unwrap_or_default();
        groups.sort_by_key(|(_, devices)| std::cmp::Reverse(devices.len()));

        let predicates = self.predicates.clone().unwrap_or_default();
        let mut output = meta_template_text.to_string();
        let mut devices_info = String::new();
        let mut parameter_table = Vec::new();

        for (index, (lines, devices)) in groups.iter().enumerate() {
            output.push_str(&format!("\nGroup {index}  :\n"));
            let mut sorted_devices: Vec<&String> = devices.iter().collect();
            sorted_devices.sort();
            devices_info.push_str(&format!(
                "\nGroup {index} : size :{}{:?}",
                devices.len(),
                sorted_devices
            ));
            for predicate in predicates.keys() {
                let present = predicates[predicate].iter().all(|l| lines.contains(l));
                output.push_str(&format!("\t{predicate} : {}", if present { "True" } else { "False" }));
            }

            let mut header = BTreeMap::new();
            header.insert("Router".to_string(), format!("Group {index}"));
            parameter_table.push(header);

            for device in sorted_devices {
                let mut row = BTreeMap::new();
                row.insert("Router".to_string(), device.clone());
                if let Some(values) = self.parameters.get(device) {
                    for (param, value) in values {
                        row.insert(param.clone(), value.clone());
                    }
                }
                parameter_table.push(row);
            }
        }
        self.groups_list = Some(groups);

        output.push('\n');
        output.push_str(&devices_info);
        output.push_str("\n\n");
        output.push_str(&serde_json::to_string_pretty(&self.parameter_distribution()).unwrap_or_default());
        (output, parameter_table)
    }

    /// One line per `(Pi, Pj)` pair where a small minority of devices that
    /// define both disagree, per `SPURIOUS_PARAM_THRESHOLD`.
    pub fn spurious_param_questions(&self, threshold: f64) -> Vec<String> {
        let mut lines = Vec::new();
        let params: Vec<String> = (0..self.counter).map(|i| format!("P{i}")).collect();
        for i in 0..params.len() {
            for j in (i + 1)..params.len() {
                let (pi, pj) = (&params[i], &params[j]);
                let mut same: Vec<&String> = Vec::new();
                let mut different: Vec<&String> = Vec::new();
                for (device, values) in &self.parameters {
                    if let (Some(vi), Some(vj)) = (values.get(pi), values.get(pj)) {
                        if vi == vj {
                            same.push(device);
                        } else {
                            different.push(device);
                        }
                    }
                }
                let total = same.len() + different.len();
                if !different.is_empty() && (different.len() as f64) < threshold * total as f64 {
                    lines.push(format!(
                        "Out of {total} routers that have {pi} and {pj}, {} routers have equal values but routers {:?} have unequal values.\n",
                        same.len(),
                        different
                    ));
                }
            }
        }
        lines
    }

    /// One line per parameter value that occurs far less often than the
    /// parameter's average value frequency, per `SINGLE_PARAM_THRESHOLD`.
    pub fn single_param_questions(&self, threshold: f64) -> Vec<String> {
        let mut counts: IndexMap<String, IndexMap<String, (usize, IndexSet<String>)>> = IndexMap::new();
        for (device, values) in &self.parameters {
            for (param, value) in values {
                let entry = counts
                    .entry(param.clone())
                    .or_default()
                    .entry(value.clone())
                    .or_insert((0, IndexSet::new()));
                entry.0 += 1;
                entry.1.insert(device.clone());
            }
        }

        let mut lines = Vec::new();
        for (param, values) in &counts {
            let total: usize = values.values().map(|(count, _)| count).sum();
            let average = total as f64 / values.len() as f64;
            for (value, (count, devices)) in values {
                if (*count as f64) < threshold * average {
                    let mut sorted: Vec<&String> = devices.iter().collect();
                    sorted.sort();
                    lines.push(format!(
                        "Out of {total} routers that have the parameter {param} routers {:?} have {value} which is in minority.\n",
                        sorted
                    ));
                }
            }
        }
        lines
    }
}

/// Replace every occurrence of a parameter in `erase_list` with
/// `replace_with`, across the meta-template and every device's parameter
/// map. Used when the minimizer coalesces a group of co-valued parameters.
pub fn modify_erase(
    meta_template: &mut BlockSequence,
    parameters_lines: &mut ParametersLinesMap,
    replace_with: &str,
    erase_list: &[String],
) {
    for block in meta_template.blocks.iter_mut() {
        for line in block.lines.iter_mut() {
            for attr in line.attrs.iter_mut() {
                if let Some(value) = attr {
                    if erase_list.iter().any(|e| e == value) {
                        *attr = Some(replace_with.to_string());
                    }
                }
            }
        }
    }

    for values in parameters_lines.parameters.values_mut() {
        let mut found_value: Option<String> = None;
        for erased in erase_list {
            if let Some(value) = values.shift_remove(erased) {
                found_value = Some(value);
            }
        }
        if found_value.is_some() || values.contains_key(replace_with) {
            values
                .entry(replace_with.to_string())
                .or_insert_with(|| found_value.unwrap_or_default());
        }
    }
}

/// Walk the meta-template in block/line/attribute order, assigning fresh
/// `P<n>` names starting at 0 in first-seen order, and propagate the
/// renaming into every device's parameter map and sort each device's
/// `line_mapping`.
pub fn remap_parameters(meta_template: &mut BlockSequence, parameters_lines: &mut ParametersLinesMap) {
    let mut old_to_new: HashMap<String, String> = HashMap::new();
    let mut count = 0usize;
    for block in meta_template.blocks.iter_mut() {
        for line in block.lines.iter_mut() {
            for value in line.attrs.iter_mut().flatten() {
                if value.starts_with('P') {
                    let renamed = old_to_new
                        .entry(value.clone())
                        .or_insert_with(|| {
                            let name = format!("P{count}");
                            count += 1;
                            name
                        })
                        .clone();
                    *value = renamed;
                }
            }
        }
    }
    parameters_lines.counter = count;

    for values in parameters_lines.parameters.values_mut() {
        let mut renamed = IndexMap::new();
        for (key, value) in values.drain(..) {
            let new_key = old_to_new.get(&key).cloned().unwrap_or(key);
            renamed.insert(new_key, value);
        }
        *values = renamed;
    }
    for lines in parameters_lines.line_mapping.values_mut() {
        lines.sort_unstable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_distribution_counts_values() {
        let mut map = ParametersLinesMap::new("A", vec![0]);
        map.parameters[0].insert("P0".to_string(), "x".to_string());
        map.parameters.insert("B".to_string(), IndexMap::new());
        map.parameters[1].insert("P0".to_string(), "x".to_string());
        let dist = map.parameter_distribution();
        assert_eq!(dist["P0"]["x"], 2);
    }

    #[test]
    fn add_parameter_skips_new_device() {
        let mut map = ParametersLinesMap::new("A", vec![0]);
        map.parameters.insert("B".to_string(), IndexMap::new());
        map.add_parameter("P0", "old", "B");
        assert_eq!(map.parameters["A"]["P0"], "old");
        assert!(!map.parameters["B"].contains_key("P0"));
    }
}
