//! Minimum-cost bipartite assignment (Kuhn-Munkres / Hungarian algorithm),
//! O(n^2 * m) with potentials. Handles rectangular cost matrices directly
//! (no padding): every row is matched to a distinct column, leaving
//! `cols - rows` columns unmatched when `cols > rows`.

/// Solve the assignment problem for `cost` (`rows` x `cols`, rectangular
/// allowed). Returns the total cost and the `(row, col)` pairs of the
/// minimum-cost matching covering every row.
pub fn solve(cost: &[Vec<i64>]) -> (i64, Vec<(usize, usize)>) {
    let rows = cost.len();
    if rows == 0 {
        return (0, Vec::new());
    }
    let cols = cost[0].len();
    if cols == 0 {
        return (0, Vec::new());
    }

    let transposed = rows > cols;
    let matrix: Vec<Vec<i64>> = if transposed {
        let mut t = vec![vec![0i64; rows]; cols];
        for (i, row) in cost.iter().enumerate() {
            for (j, &c) in row.iter().enumerate() {
                t[j][i] = c;
            }
        }
        t
    } else {
        cost.to_vec()
    };
    let (n, m) = (matrix.len(), matrix[0].len());

    const INF: i64 = i64::MAX / 4;
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; m + 1];
    let mut p = vec![0usize; m + 1]; // p[j] = 1-indexed row matched to column j
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![INF; m + 1];
        let mut used = vec![false; m + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0usize;
            for j in 1..=m {
                if !used[j] {
                    let cur = matrix[i0 - 1][j - 1] - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0usize; n];
    for j in 1..=m {
        if p[j] > 0 {
            row_to_col[p[j] - 1] = j - 1;
        }
    }

    let mut total = 0i64;
    let mut pairs = Vec::with_capacity(n);
    for (i, &j) in row_to_col.iter().enumerate() {
        total += matrix[i][j];
        pairs.push(if transposed { (j, i) } else { (i, j) });
    }
    (total, pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_square_matrix() {
        let cost = vec![vec![4, 1, 3], vec![2, 0, 5], vec![3, 2, 2]];
        let (total, pairs) = solve(&cost);
        assert_eq!(total, 5);
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn solves_rectangular_more_columns_than_rows() {
        let cost = vec![vec![1, 2, 3], vec![4, 1, 2]];
        let (total, pairs) = solve(&cost);
        assert_eq!(pairs.len(), 2);
        assert_eq!(total, 1 + 1);
    }

    #[test]
    fn solves_rectangular_more_rows_than_columns() {
        let cost = vec![vec![1, 4], vec![2, 1], vec![3, 2]];
        let (total, pairs) = solve(&cost);
        assert_eq!(pairs.len(), 2);
        assert_eq!(total, 1 + 1);
    }
}
