//! Global (Needleman-Wunsch style) alignment of two block sequences.
//!
//! Dynamic-programming alignment where "matching" two blocks costs the
//! bipartite line-matching score and "skipping" a block costs its gap
//! penalty. Tie-breaking is mandatory for deterministic output: a
//! diagonal (block1-matches-block2) move is preferred over either gap
//! move on a tie, and a gap in sequence 1 is preferred over a gap in
//! sequence 2 on a further tie.

use crate::flavor::{block_gap_penalty, ParamValueMap, SegmentFlavor};
use crate::matching::bipartite_match;
use crate::model::{Block, BlockSequence};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pointer {
    Start,
    Diagonal,
    GapSecond,
    GapFirst,
}

struct Cell {
    score: i64,
    pointer: Pointer,
    matched_lines: Vec<(usize, usize)>,
}

/// One aligned column: either sequence may contribute a real block or a
/// gap (`None`), never both absent.
pub enum AlignedColumn<'a> {
    /// Both sequences contribute a block, plus the line matching between
    /// them.
    Matched(&'a Block, &'a Block, Vec<(usize, usize)>),
    /// Only sequence 2 (the device) contributes a block.
    GapInFirst(&'a Block),
    /// Only sequence 1 (the running meta-template) contributes a block.
    GapInSecond(&'a Block),
}

/// Align `bs1` (the running meta-template) against `bs2` (the next
/// device's segment), returning one [`AlignedColumn`] per alignment
/// position in order.
pub fn align_sequences<'a>(
    flavor: &dyn SegmentFlavor,
    bs1: &'a BlockSequence,
    bs2: &'a BlockSequence,
    param_value_map: &ParamValueMap,
) -> Vec<AlignedColumn<'a>> {
    let m = bs1.blocks.len();
    let n = bs2.blocks.len();

    let mut dp: Vec<Vec<Cell>> = (0..=m)
        .map(|_| (0..=n).map(|_| Cell { score: 0, pointer: Pointer::Start, matched_lines: Vec::new() }).collect())
        .collect();

    for i in 1..=m {
        dp[i][0].score = dp[i - 1][0].score + block_gap_penalty(flavor, &bs1.blocks[i - 1]) as i64;
        dp[i][0].pointer = Pointer::GapSecond;
    }
    for j in 1..=n {
        dp[0][j].score = dp[0][j - 1].score + block_gap_penalty(flavor, &bs2.blocks[j - 1]) as i64;
        dp[0][j].pointer = Pointer::GapFirst;
    }

    for i in 1..=m {
        for j in 1..=n {
            let block1 = &bs1.blocks[i - 1];
            let block2 = &bs2.blocks[j - 1];
            let (pair_score, matched) = if block1.action != block2.action {
                (crate::constants::INFINITY as i64, Vec::new())
            } else {
                let (s, m) = bipartite_match(flavor, &block1.lines, &block2.lines, param_value_map);
                (s as i64, m)
            };
            let block1_gap = block_gap_penalty(flavor, block1) as i64;
            let block2_gap = block_gap_penalty(flavor, block2) as i64;

            let diagonal = dp[i - 1][j - 1].score + pair_score;
            let gap_second = dp[i][j - 1].score + block2_gap; // consume only bs2's block
            let gap_first = dp[i - 1][j].score + block1_gap; // consume only bs1's block

            if diagonal <= gap_first {
                if diagonal <= gap_second {
                    dp[i][j].score = diagonal;
                    dp[i][j].pointer = Pointer::Diagonal;
                    dp[i][j].matched_lines = matched;
                } else {
                    dp[i][j].score = gap_second;
                    dp[i][j].pointer = Pointer::GapFirst;
                }
            } else if gap_first <= gap_second {
                dp[i][j].score = gap_first;
                dp[i][j].pointer = Pointer::GapSecond;
            } else {
                dp[i][j].score = gap_second;
                dp[i][j].pointer = Pointer::GapFirst;
            }
        }
    }

    let mut i = m;
    let mut j = n;
    let mut columns = Vec::new();
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && dp[i][j].pointer == Pointer::Diagonal {
            columns.push(AlignedColumn::Matched(&bs1.blocks[i - 1], &bs2.blocks[j - 1], dp[i][j].matched_lines.clone()));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i][j].pointer == Pointer::GapFirst) {
            columns.push(AlignedColumn::GapInFirst(&bs2.blocks[j - 1]));
            j -= 1;
        } else {
            columns.push(AlignedColumn::GapInSecond(&bs1.blocks[i - 1]));
            i -= 1;
        }
    }
    columns.reverse();
    columns
}
