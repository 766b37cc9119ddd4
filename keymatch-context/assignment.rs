use crate::cost::CostMatrix;

/// Row to column bijection of a square cost matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    columns: Vec<usize>,
}

impl Assignment {
    /// `columns()[row]` is the column assigned to `row`
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Sum of the selected entries
    pub fn total_cost(&self, matrix: &CostMatrix) -> f64 {
        self.columns
            .iter()
            .enumerate()
            .map(|(row, &col)| matrix.get(row, col))
            .sum()
    }
}

/// Minimum-cost assignment by the Hungarian method with row and column
/// potentials. O(n^3) and deterministic for a given matrix.
pub fn solve(matrix: &CostMatrix) -> Assignment {
    let n = matrix.size();
    // 1-based: index 0 of `p` and `way` is a virtual column
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = matrix.get(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
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

        // Flip the augmenting path back to the virtual column
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut columns = vec![0usize; n];
    for j in 1..=n {
        columns[p[j] - 1] = j - 1;
    }
    Assignment { columns }
}
