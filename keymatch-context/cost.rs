use keymatch_core::{ShapeDescriptor, SAMPLE_POINTS};
use rayon::prelude::*;
use crate::error::{ContextError, ContextResult};

/// Chi-squared dissimilarity of two histograms, `0.5 * sum (a - b)^2 / (a + b)`.
/// Cells empty in both histograms contribute nothing.
pub fn chi_squared(a: &[u32], b: &[u32]) -> f64 {
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let denominator = x as f64 + y as f64;
            if denominator == 0.0 {
                0.0
            } else {
                let diff = x as f64 - y as f64;
                diff * diff / denominator
            }
        })
        .sum();
    0.5 * sum
}

/// Square matrix of finite, non-negative costs, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    size: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Validate and flatten `rows`. Every row must have as many entries as
    /// there are rows and every entry must be finite and non-negative.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> ContextResult<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(ContextError::DimensionMismatch { rows: size, cols: values.len() });
            }
            for (col, &value) in values.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(ContextError::InvalidCost { row, col, value });
                }
            }
            data.extend(values);
        }
        Ok(Self { size, data })
    }

    /// Pairwise chi-squared costs between the sampled points of two descriptors
    pub fn between(query: &ShapeDescriptor, candidate: &ShapeDescriptor) -> Self {
        let data: Vec<f64> = (0..SAMPLE_POINTS)
            .into_par_iter()
            .flat_map_iter(|i| {
                let row = query.point_histogram(i);
                (0..SAMPLE_POINTS).map(move |j| chi_squared(row, candidate.point_histogram(j)))
            })
            .collect();
        Self { size: SAMPLE_POINTS, data }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.size + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.size..(row + 1) * self.size]
    }
}
