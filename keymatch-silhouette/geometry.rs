use std::f64::consts::FRAC_PI_2;

use keymatch_core::{BoundaryPoint, BoundarySet};
use log::debug;
use crate::config::SilhouetteConfig;
use crate::types::KeyGeometry;

/// Line through two boundary points, kept in slope-intercept form unless it
/// is vertical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectedLine {
    Vertical { x: f64 },
    Sloped { m: f64, b: f64 },
}

impl ProjectedLine {
    pub fn through(p0: BoundaryPoint, p1: BoundaryPoint) -> Self {
        let dx = p1.x as f64 - p0.x as f64;
        let dy = p1.y as f64 - p0.y as f64;
        if dx == 0.0 {
            ProjectedLine::Vertical { x: p0.x as f64 }
        } else {
            let m = dy / dx;
            ProjectedLine::Sloped {
                m,
                b: p0.y as f64 - m * p0.x as f64,
            }
        }
    }

    /// Angle from the horizontal in radians, in `(-pi/2, pi/2]`
    pub fn angle(&self) -> f64 {
        match *self {
            ProjectedLine::Vertical { .. } => FRAC_PI_2,
            ProjectedLine::Sloped { m, .. } => m.atan(),
        }
    }

    /// Distance from `p` to the foot of the perpendicular dropped onto the line
    pub fn perpendicular_distance(&self, p: BoundaryPoint) -> f64 {
        let (px, py) = (p.x as f64, p.y as f64);
        match *self {
            ProjectedLine::Vertical { x } => (px - x).abs(),
            ProjectedLine::Sloped { m, b } if m == 0.0 => (py - b).abs(),
            ProjectedLine::Sloped { m, b } => {
                let m_perp = -1.0 / m;
                let b_perp = py - m_perp * px;
                let ix = (b_perp - b) / (m - m_perp);
                let iy = m * ix + b;
                ((ix - px).powi(2) + (iy - py).powi(2)).sqrt()
            }
        }
    }
}

/// Locates the blade of a key on its boundary and drops the toothed region
#[derive(Debug, Clone)]
pub struct GeometricNormalizer {
    blade_distance_threshold: f64,
    blade_projection_length: usize,
    angle_offset_threshold: f64,
}

impl GeometricNormalizer {
    pub fn new(config: &SilhouetteConfig) -> Self {
        Self {
            blade_distance_threshold: config.blade_distance_threshold,
            blade_projection_length: config.blade_projection_length,
            angle_offset_threshold: config.angle_offset_threshold,
        }
    }

    /// Tilt of the line through the first and last boundary points
    pub fn angle_offset(edges: &[BoundaryPoint]) -> Option<f64> {
        let top = edges.first()?;
        let bottom = edges.last()?;
        let dx = top.x as f64 - bottom.x as f64;
        let dy = top.y as f64 - bottom.y as f64;
        if dx == 0.0 {
            Some(FRAC_PI_2)
        } else {
            Some((dy / dx).atan())
        }
    }

    /// First point, walking the right edge downwards, whose line to the next
    /// point has roughly the key's tilt and stays within the distance threshold
    /// of the following `blade_projection_length - 1` right-edge points.
    /// Falls back to the topmost point.
    ///
    /// The tilt test is one-sided: it accepts any projected angle down to
    /// `angle_offset - angle_offset_threshold` and above.
    pub fn blade_beginning(&self, right_edge: &[BoundaryPoint], angle_offset: f64) -> Option<BoundaryPoint> {
        let first = *right_edge.first()?;

        for i in 1..right_edge.len() {
            let p0 = right_edge[i - 1];
            let line = ProjectedLine::through(p0, right_edge[i]);

            if angle_offset - line.angle() > self.angle_offset_threshold {
                continue;
            }

            let end = (i + self.blade_projection_length).min(right_edge.len());
            let straight = right_edge[(i + 1).min(end)..end]
                .iter()
                .all(|&p| line.perpendicular_distance(p) <= self.blade_distance_threshold);

            if straight {
                return Some(p0);
            }
        }

        Some(first)
    }

    /// The lowest boundary point (first one on ties) and the dividing point
    /// `(tip.x, blade_beginning.y)`.
    pub fn key_center(blade_beginning: BoundaryPoint, edges: &[BoundaryPoint]) -> Option<(BoundaryPoint, BoundaryPoint)> {
        let mut tip = *edges.first()?;
        for &p in edges {
            if p.y > tip.y {
                tip = p;
            }
        }
        Some((tip, BoundaryPoint::new(tip.x, blade_beginning.y)))
    }

    /// Drop every point at or left of the center and at or below it
    pub fn clean_edges(center: BoundaryPoint, edges: &[BoundaryPoint]) -> BoundarySet {
        edges
            .iter()
            .copied()
            .filter(|p| p.x > center.x || p.y < center.y)
            .collect()
    }

    /// Compute all landmarks. `None` only for an empty boundary.
    pub fn analyze(&self, edges: &[BoundaryPoint], right_edge: &[BoundaryPoint]) -> Option<KeyGeometry> {
        let angle_offset = Self::angle_offset(edges)?;
        let blade_beginning = self.blade_beginning(right_edge, angle_offset)?;
        let (tip, center) = Self::key_center(blade_beginning, edges)?;
        debug!(
            "angle offset {:.4} rad, blade beginning {}, tip {}, center {}",
            angle_offset, blade_beginning, tip, center
        );
        Some(KeyGeometry {
            angle_offset,
            blade_beginning,
            tip,
            center,
        })
    }
}
