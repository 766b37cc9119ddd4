use keymatch_core::ShapeDescriptor;
use log::info;
use rayon::prelude::*;
use crate::assignment::{self, Assignment};
use crate::cost::CostMatrix;
use crate::error::{ContextError, ContextResult};

/// Result of comparing a query against a single reference descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    /// Sum of the assigned chi-squared costs
    pub cost: f64,
    pub assignment: Assignment,
}

/// Best reference for a query, together with every candidate's total cost
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Zero-based index into the reference set
    pub best_index: usize,
    /// Total cost per reference, in reference order
    pub costs: Vec<f64>,
}

impl MatchOutcome {
    pub fn best_cost(&self) -> f64 {
        self.costs[self.best_index]
    }
}

/// Shape-context matching of a query descriptor against a reference set
pub struct Matcher;

impl Matcher {
    /// Optimal point correspondence between two descriptors and its cost
    pub fn compare(query: &ShapeDescriptor, candidate: &ShapeDescriptor) -> MatchCandidate {
        let matrix = CostMatrix::between(query, candidate);
        let assignment = assignment::solve(&matrix);
        MatchCandidate {
            cost: assignment.total_cost(&matrix),
            assignment,
        }
    }

    /// Index of the lowest-cost reference; the earliest one wins ties
    pub fn match_key(query: &ShapeDescriptor, references: &[ShapeDescriptor]) -> ContextResult<MatchOutcome> {
        if references.is_empty() {
            return Err(ContextError::EmptyReferenceSet);
        }

        let costs: Vec<f64> = references
            .par_iter()
            .map(|candidate| Self::compare(query, candidate).cost)
            .collect();

        let mut best_index = 0;
        for (index, &cost) in costs.iter().enumerate() {
            info!("key {}: cost {:.4}", index, cost);
            if cost < costs[best_index] {
                best_index = index;
            }
        }
        info!("best match: key {}", best_index);

        Ok(MatchOutcome { best_index, costs })
    }
}
