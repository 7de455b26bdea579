//! Bipartite line matching: given two blocks' line sequences, find the
//! minimum-cost matching between them under a flavor's [`line_score`].
//!
//! Before invoking the assignment solver, lines that are byte-for-byte
//! identical except for their identity are matched for free by hashing on
//! [`crate::model::Line::content_key`] — this is the dominant case on real
//! fleets (most lines across devices are exact duplicates) and skips the
//! O(n^3) solver entirely when it applies.

mod hungarian;

use std::collections::HashMap;

use crate::constants::INFINITY;
use crate::flavor::{ParamValueMap, SegmentFlavor};
use crate::model::Line;

/// Minimum-cost matching between `ls1` (template lines) and `ls2` (device
/// lines). Returns the total score (gap penalty already included for
/// leftover, unmatched lines on either side) and the `(ls1_index,
/// ls2_index)` pairs chosen.
pub fn bipartite_match(
    flavor: &dyn SegmentFlavor,
    ls1: &[Line],
    ls2: &[Line],
    param_value_map: &ParamValueMap,
) -> (u32, Vec<(usize, usize)>) {
    let mut ls1_by_key: HashMap<_, Vec<usize>> = HashMap::new();
    for (i, line) in ls1.iter().enumerate() {
        ls1_by_key.entry(line.content_key()).or_default().push(i);
    }

    let mut matched = Vec::new();
    let mut ls1_matched = vec![false; ls1.len()];
    let mut ls2_matched = vec![false; ls2.len()];

    for (j, line) in ls2.iter().enumerate() {
        let key = line.content_key();
        if let Some(candidates) = ls1_by_key.get_mut(&key) {
            if let Some(i) = candidates.pop() {
                ls1_matched[i] = true;
                ls2_matched[j] = true;
                matched.push((i, j));
            }
        }
    }

    let remaining_ls1: Vec<usize> = (0..ls1.len()).filter(|&i| !ls1_matched[i]).collect();
    let remaining_ls2: Vec<usize> = (0..ls2.len()).filter(|&j| !ls2_matched[j]).collect();

    let line_penalty = flavor.line_penalty() as i64;
    let mut score: i64 = 0;

    if !remaining_ls1.is_empty() && !remaining_ls2.is_empty() {
        let cost: Vec<Vec<i64>> = remaining_ls1
            .iter()
            .map(|&i| {
                remaining_ls2
                    .iter()
                    .map(|&j| flavor.line_score(&ls1[i], &ls2[j], param_value_map) as i64)
                    .collect()
            })
            .collect();
        let (_, pairs) = hungarian::solve(&cost);
        for (x, y) in pairs {
            let cost_xy = cost[x][y];
            if cost_xy != INFINITY as i64 {
                matched.push((remaining_ls1[x], remaining_ls2[y]));
                score += cost_xy;
            } else {
                score += line_penalty;
            }
        }
    }

    score += line_penalty * (ls1.len() as i64 - ls2.len() as i64).unsigned_abs() as i64;
    (score.max(0) as u32, matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flavor::AclFlavor;

    #[test]
    fn identical_lines_match_for_free() {
        let flavor = AclFlavor;
        let mut a = Line::new(Some("tcp".into()), 0, 20);
        a.set_attr(0, "10");
        let mut b = Line::new(Some("tcp".into()), 5, 20);
        b.set_attr(0, "10");
        let map = ParamValueMap::new();
        let (score, matched) = bipartite_match(&flavor, &[a], &[b], &map);
        assert_eq!(score, 0);
        assert_eq!(matched, vec![(0, 0)]);
    }
}
