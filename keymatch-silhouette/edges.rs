use keymatch_core::{BinaryGrid, BoundaryPoint, BoundarySet, Pixel};

/// Boundary tracing on a cleaned binary grid
pub struct EdgeExtractor;

impl EdgeExtractor {
    /// Every `Black` cell with all four axis neighbours inside the grid and at
    /// least one of them `White`, in row-major order.
    pub fn find_edges(grid: &BinaryGrid) -> BoundarySet {
        let (w, h) = (grid.width(), grid.height());
        let mut edges = Vec::new();
        if w < 3 || h < 3 {
            return edges;
        }

        for y in 1..h - 1 {
            for x in 1..w - 1 {
                if grid.get(x, y) != Pixel::Black {
                    continue;
                }
                let touches_background = grid.get(x, y - 1) == Pixel::White
                    || grid.get(x, y + 1) == Pixel::White
                    || grid.get(x - 1, y) == Pixel::White
                    || grid.get(x + 1, y) == Pixel::White;
                if touches_background {
                    edges.push(BoundaryPoint::new(x, y));
                }
            }
        }

        edges
    }

    /// Rightmost point of every row, top to bottom. Relies on the row-major
    /// order of `edges`: within a row the last point seen is the rightmost.
    pub fn right_edge(edges: &[BoundaryPoint]) -> BoundarySet {
        let mut right: BoundarySet = Vec::new();
        for &p in edges {
            match right.last_mut() {
                Some(last) if last.y == p.y => {
                    if p.x > last.x {
                        *last = p;
                    }
                }
                _ => right.push(p),
            }
        }
        right
    }
}
