use keymatch_core::{BinaryGrid, BoundarySet, IntensityGrid};
use crate::types::KeyGeometry;

/// Receives the output of each silhouette stage as it is produced.
///
/// Every callback defaults to doing nothing. Observers only see borrowed
/// data and have no way to influence the pipeline.
pub trait StageObserver {
    fn grayscale(&mut self, _grid: &IntensityGrid) {}

    fn binarized(&mut self, _grid: &BinaryGrid, _threshold: Option<u8>) {}

    fn cleaned(&mut self, _grid: &BinaryGrid) {}

    /// Full boundary and its per-row rightmost points
    fn boundary(&mut self, _boundary: &BoundarySet, _right_edge: &BoundarySet) {}

    /// Landmarks and the boundary left after dropping the teeth region
    fn normalized(&mut self, _geometry: &KeyGeometry, _edges: &BoundarySet) {}
}

/// Observer that ignores every stage
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {}
