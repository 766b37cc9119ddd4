use keymatch_core::{BinaryGrid, BoundaryPoint, BoundarySet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the run-length box fill walks the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BoxFillMode {
    /// Vertical runs are only tracked down column 0 and horizontal runs follow
    /// the flattened buffer, so a fill can continue past the end of a row.
    #[default]
    Legacy,
    /// Vertical runs in every column, horizontal runs restarted on each row.
    RowClipped,
}

/// Which cells the horizontal contagion test is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SmoothingRule {
    /// Only cells within `d` rows of the top or bottom border, where the
    /// vertical neighbours fall outside the grid.
    #[default]
    Legacy,
    /// Every cell the vertical test left unchanged.
    Combined,
}

/// Landmarks found on the boundary of a key silhouette
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyGeometry {
    /// Tilt of the line through the topmost and bottommost boundary points,
    /// measured from the horizontal in radians
    pub angle_offset: f64,
    /// Where the straight right side of the blade starts
    pub blade_beginning: BoundaryPoint,
    /// Lowest boundary point, the blade tip
    pub tip: BoundaryPoint,
    /// `(tip.x, blade_beginning.y)`; the corner of the discarded teeth region
    pub center: BoundaryPoint,
}

/// Everything the silhouette stages produce for one image
#[derive(Debug, Clone)]
pub struct Silhouette {
    pub threshold: Option<u8>,
    pub cleaned: BinaryGrid,
    pub boundary: BoundarySet,
    pub right_edge: BoundarySet,
    /// `None` when the image has no boundary at all
    pub geometry: Option<KeyGeometry>,
    /// Boundary with the toothed lower-left region removed
    pub edges: BoundarySet,
}
