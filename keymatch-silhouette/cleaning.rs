use keymatch_core::{BinaryGrid, Pixel};
use log::{debug, warn};
use crate::config::SilhouetteConfig;
use crate::types::{BoxFillMode, SmoothingRule};

/// Removes noise blobs and thin artifacts from a binarized image.
///
/// Two phases run in order: contagion smoothing at growing distances, then a
/// single run-length box fill (vertical runs first, horizontal runs second).
#[derive(Debug, Clone)]
pub struct SilhouetteCleaner {
    max_cleaning_distance: usize,
    smoothing: SmoothingRule,
    min_box_width: usize,
    min_box_height: usize,
    box_fill: BoxFillMode,
    max_smoothing_passes: usize,
}

impl SilhouetteCleaner {
    pub fn new(config: &SilhouetteConfig) -> Self {
        Self {
            max_cleaning_distance: config.max_cleaning_distance,
            smoothing: config.smoothing,
            min_box_width: config.min_box_width,
            min_box_height: config.min_box_height,
            box_fill: config.box_fill,
            max_smoothing_passes: config.max_smoothing_passes,
        }
    }

    /// Run both cleaning phases in place
    pub fn clean(&self, grid: &mut BinaryGrid) {
        self.smooth(grid);
        self.fill_boxes(grid);
    }

    /// Contagion smoothing for `d = 1 .. max_cleaning_distance`, each distance
    /// repeated until a full scan changes nothing. Returns the total number of
    /// scans performed.
    pub fn smooth(&self, grid: &mut BinaryGrid) -> usize {
        let mut total_passes = 0;
        for dist in 1..self.max_cleaning_distance {
            let mut passes = 0;
            loop {
                passes += 1;
                if !Self::smoothing_pass(grid, dist, self.smoothing) {
                    break;
                }
                if passes >= self.max_smoothing_passes {
                    warn!(
                        "smoothing at distance {} stopped after {} passes without converging",
                        dist, passes
                    );
                    break;
                }
            }
            debug!("smoothing distance {}: {} passes", dist, passes);
            total_passes += passes;
        }
        total_passes
    }

    /// One in-place scan. A cell whose two neighbours at `dist` rows above and
    /// below agree with each other but not with it takes their value. The
    /// same test on the neighbours `dist` columns left and right within the
    /// row runs where `rule` allows it.
    fn smoothing_pass(grid: &mut BinaryGrid, dist: usize, rule: SmoothingRule) -> bool {
        let (w, h) = (grid.width(), grid.height());
        let cells = grid.cells_mut();
        let mut changed = false;

        for i in 0..cells.len() {
            let (x, y) = (i % w, i / w);
            let center = cells[i];

            if y >= dist && y + dist < h {
                let above = cells[i - w * dist];
                let below = cells[i + w * dist];
                if center != above && above == below {
                    cells[i] = above;
                    changed = true;
                    continue;
                }
                if rule == SmoothingRule::Legacy {
                    continue;
                }
            }

            if x >= dist && x + dist < w {
                let left = cells[i - dist];
                let right = cells[i + dist];
                if center != left && left == right {
                    cells[i] = left;
                    changed = true;
                }
            }
        }

        changed
    }

    /// Overwrite constant runs shorter than the minimum box dimension with the
    /// value of the cell preceding the run.
    pub fn fill_boxes(&self, grid: &mut BinaryGrid) {
        let (w, h) = (grid.width(), grid.height());
        let cells = grid.cells_mut();

        match self.box_fill {
            BoxFillMode::Legacy => {
                Self::fill_column(cells, w, h, 0, self.min_box_height);
                Self::fill_runs(cells, self.min_box_width);
            }
            BoxFillMode::RowClipped => {
                for x in 0..w {
                    Self::fill_column(cells, w, h, x, self.min_box_height);
                }
                for row in cells.chunks_mut(w) {
                    Self::fill_runs(row, self.min_box_width);
                }
            }
        }
    }

    fn fill_column(cells: &mut [Pixel], w: usize, h: usize, x: usize, min_len: usize) {
        let mut run_start = 0;
        for y in 1..h {
            let i = y * w + x;
            if cells[i] != cells[i - w] {
                if y - run_start < min_len && run_start > 0 {
                    let fill = cells[(run_start - 1) * w + x];
                    for r in run_start..y {
                        cells[r * w + x] = fill;
                    }
                }
                run_start = y;
            }
        }
    }

    fn fill_runs(cells: &mut [Pixel], min_len: usize) {
        let mut run_start = 0;
        for i in 1..cells.len() {
            if cells[i] != cells[i - 1] {
                if i - run_start < min_len && run_start > 0 {
                    let fill = cells[run_start - 1];
                    cells[run_start..i].fill(fill);
                }
                run_start = i;
            }
        }
    }
}
