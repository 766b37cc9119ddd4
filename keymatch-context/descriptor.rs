use std::f64::consts::{FRAC_PI_2, PI, TAU};

use keymatch_core::{BoundaryPoint, ShapeDescriptor, BINS_PER_POINT, LOG_BINS, RADIAL_BINS, SAMPLE_POINTS};
use log::debug;
use rayon::prelude::*;
use crate::error::{ContextError, ContextResult};

/// Normalized distances are multiplied by this before taking the log so that
/// they spread over more than the first log bin.
pub const LOG_SCALE_FACTOR: f64 = 10.0;

/// Builds log-polar shape contexts from a boundary point set.
///
/// Angles at each sampled point are measured from the direction of the
/// vector leading into it from the previous sample. Descriptors written by
/// older tools that derived that direction from the slope alone fall into
/// different radial bins, so a database must be rebuilt with this builder
/// before it can be matched against.
pub struct ShapeDescriptorBuilder;

impl ShapeDescriptorBuilder {
    /// Take `SAMPLE_POINTS` points at a fixed stride, starting with the first
    pub fn sample_points(edges: &[BoundaryPoint]) -> ContextResult<Vec<BoundaryPoint>> {
        if edges.len() < SAMPLE_POINTS {
            return Err(ContextError::InsufficientPoints {
                found: edges.len(),
                required: SAMPLE_POINTS,
            });
        }
        let stride = edges.len() / SAMPLE_POINTS;
        Ok(edges.iter().step_by(stride).take(SAMPLE_POINTS).copied().collect())
    }

    /// Row-major `n x n` pairwise distances divided by their mean (self
    /// distances included) and scaled by [`LOG_SCALE_FACTOR`].
    pub fn normalized_distances(points: &[BoundaryPoint]) -> Vec<f64> {
        let mut distances: Vec<f64> = points
            .par_iter()
            .flat_map_iter(|p| points.iter().map(move |q| p.distance(q)))
            .collect();

        let sum: f64 = distances.iter().sum();
        let mean = if distances.is_empty() { 0.0 } else { sum / distances.len() as f64 };
        debug!("mean pairwise distance {:.3} over {} points", mean, points.len());

        // Every sampled point coincides: all distances stay at zero
        if mean > 0.0 {
            let scale = LOG_SCALE_FACTOR / mean;
            distances.iter_mut().for_each(|d| *d *= scale);
        }
        distances
    }

    /// Angle of the vector `(dx, dy)` from the positive x axis, in `[0, 2pi)`.
    /// The zero vector maps to 0.
    pub fn find_angle(dx: f64, dy: f64) -> f64 {
        if dx == 0.0 {
            return if dy > 0.0 {
                FRAC_PI_2
            } else if dy < 0.0 {
                PI + FRAC_PI_2
            } else {
                0.0
            };
        }
        if dy == 0.0 {
            return if dx > 0.0 { 0.0 } else { PI };
        }

        let angle = (dy / dx).atan();
        match (dx > 0.0, dy > 0.0) {
            (true, true) => angle,
            (false, _) => angle + PI,
            (true, false) => angle + TAU,
        }
    }

    #[inline]
    pub fn radial_bin(angle: f64) -> usize {
        let bin = (angle * RADIAL_BINS as f64 / TAU) as usize;
        bin.min(RADIAL_BINS - 1)
    }

    /// `floor(ln d)` clamped into `0 .. LOG_BINS`; anything below 1 lands in bin 0
    #[inline]
    pub fn log_bin(distance: f64) -> usize {
        if distance < 1.0 {
            return 0;
        }
        (distance.ln() as usize).min(LOG_BINS - 1)
    }

    fn point_histogram(points: &[BoundaryPoint], distances: &[f64], i: usize) -> [u32; BINS_PER_POINT] {
        let n = points.len();
        let p = points[i];
        let prev = points[if i == 0 { n - 1 } else { i - 1 }];
        let reference = Self::find_angle(
            p.x as f64 - prev.x as f64,
            p.y as f64 - prev.y as f64,
        );

        let mut histogram = [0u32; BINS_PER_POINT];
        for (j, q) in points.iter().enumerate() {
            if j == i {
                continue;
            }
            let raw = Self::find_angle(q.x as f64 - p.x as f64, q.y as f64 - p.y as f64);
            let mut angle = raw - reference;
            if angle < 0.0 {
                angle += TAU;
            }
            let radial = Self::radial_bin(angle);
            let log = Self::log_bin(distances[i * n + j]);
            histogram[radial * LOG_BINS + log] += 1;
        }
        histogram
    }

    /// Sample the boundary and build one log-polar histogram per sampled point
    pub fn build(edges: &[BoundaryPoint]) -> ContextResult<ShapeDescriptor> {
        let points = Self::sample_points(edges)?;
        let distances = Self::normalized_distances(&points);

        let histograms: Vec<[u32; BINS_PER_POINT]> = (0..points.len())
            .into_par_iter()
            .map(|i| Self::point_histogram(&points, &distances, i))
            .collect();

        let mut descriptor = ShapeDescriptor::new();
        for (i, histogram) in histograms.iter().enumerate() {
            descriptor.point_histogram_mut(i).copy_from_slice(histogram);
        }
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_4;

    /// Rectangle outline in row-major order
    fn outline(x0: usize, y0: usize, width: usize, height: usize) -> Vec<BoundaryPoint> {
        let mut points = Vec::new();
        for y in y0..y0 + height {
            if y == y0 || y == y0 + height - 1 {
                points.extend((x0..x0 + width).map(|x| BoundaryPoint::new(x, y)));
            } else {
                points.push(BoundaryPoint::new(x0, y));
                points.push(BoundaryPoint::new(x0 + width - 1, y));
            }
        }
        points
    }

    #[test]
    fn test_find_angle_axes_and_quadrants() {
        assert_eq!(ShapeDescriptorBuilder::find_angle(1.0, 0.0), 0.0);
        assert_eq!(ShapeDescriptorBuilder::find_angle(0.0, 2.0), FRAC_PI_2);
        assert_eq!(ShapeDescriptorBuilder::find_angle(-3.0, 0.0), PI);
        assert_eq!(ShapeDescriptorBuilder::find_angle(0.0, -1.0), 3.0 * FRAC_PI_2);
        assert_eq!(ShapeDescriptorBuilder::find_angle(0.0, 0.0), 0.0);

        assert_relative_eq!(ShapeDescriptorBuilder::find_angle(1.0, 1.0), FRAC_PI_4);
        assert_relative_eq!(ShapeDescriptorBuilder::find_angle(-1.0, 1.0), 3.0 * FRAC_PI_4);
        assert_relative_eq!(ShapeDescriptorBuilder::find_angle(-1.0, -1.0), 5.0 * FRAC_PI_4);
        assert_relative_eq!(ShapeDescriptorBuilder::find_angle(1.0, -1.0), 7.0 * FRAC_PI_4);
    }

    #[test]
    fn test_bins_are_clamped() {
        assert_eq!(ShapeDescriptorBuilder::radial_bin(0.0), 0);
        assert_eq!(ShapeDescriptorBuilder::radial_bin(TAU), RADIAL_BINS - 1);
        assert_eq!(ShapeDescriptorBuilder::log_bin(0.0), 0);
        assert_eq!(ShapeDescriptorBuilder::log_bin(0.5), 0);
        assert_eq!(ShapeDescriptorBuilder::log_bin(2.0), 0);
        assert_eq!(ShapeDescriptorBuilder::log_bin(3.0), 1);
        assert_eq!(ShapeDescriptorBuilder::log_bin(1.0e9), LOG_BINS - 1);
    }

    #[test]
    fn test_sampling_stride() {
        let edges: Vec<BoundaryPoint> = (0..450).map(|i| BoundaryPoint::new(i, 0)).collect();
        let sampled = ShapeDescriptorBuilder::sample_points(&edges).unwrap();
        assert_eq!(sampled.len(), SAMPLE_POINTS);
        assert_eq!(sampled[1], BoundaryPoint::new(2, 0));
        assert_eq!(sampled[199], BoundaryPoint::new(398, 0));
    }

    #[test]
    fn test_too_few_points() {
        let edges: Vec<BoundaryPoint> = (0..199).map(|i| BoundaryPoint::new(i, 0)).collect();
        assert_eq!(
            ShapeDescriptorBuilder::build(&edges),
            Err(ContextError::InsufficientPoints { found: 199, required: SAMPLE_POINTS })
        );
        assert_eq!(
            ShapeDescriptorBuilder::build(&[]),
            Err(ContextError::InsufficientPoints { found: 0, required: SAMPLE_POINTS })
        );
    }

    #[test]
    fn test_distances_normalized_by_mean() {
        let points = vec![BoundaryPoint::new(0, 0), BoundaryPoint::new(4, 0)];
        // Four entries: 0, 4, 4, 0 with mean 2
        let distances = ShapeDescriptorBuilder::normalized_distances(&points);
        assert_eq!(distances, vec![0.0, 20.0, 20.0, 0.0]);

        let same = vec![BoundaryPoint::new(3, 3); 3];
        assert!(ShapeDescriptorBuilder::normalized_distances(&same).iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_every_point_votes_once_per_other_point() {
        let descriptor = ShapeDescriptorBuilder::build(&outline(5, 5, 40, 80)).unwrap();
        for i in 0..SAMPLE_POINTS {
            assert_eq!(descriptor.point_total(i), (SAMPLE_POINTS - 1) as u32);
        }
    }

    #[test]
    fn test_translation_invariance() {
        let a = ShapeDescriptorBuilder::build(&outline(5, 5, 40, 80)).unwrap();
        let b = ShapeDescriptorBuilder::build(&outline(105, 37, 40, 80)).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_point_totals(points in proptest::collection::vec((0usize..500, 0usize..500), 200..320)) {
            let edges: Vec<BoundaryPoint> = points.into_iter().map(|(x, y)| BoundaryPoint::new(x, y)).collect();
            let descriptor = ShapeDescriptorBuilder::build(&edges).unwrap();
            for i in 0..SAMPLE_POINTS {
                prop_assert_eq!(descriptor.point_total(i), (SAMPLE_POINTS - 1) as u32);
            }
        }
    }
}
