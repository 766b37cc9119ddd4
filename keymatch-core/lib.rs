#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of boundary points sampled into every shape descriptor
pub const SAMPLE_POINTS: usize = 200;
/// Angular bins of the log-polar histogram
pub const RADIAL_BINS: usize = 12;
/// Log-distance bins of the log-polar histogram
pub const LOG_BINS: usize = 5;
/// Histogram cells per sampled point
pub const BINS_PER_POINT: usize = RADIAL_BINS * LOG_BINS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    InvalidDimensions { width: usize, height: usize },
    DataLengthMismatch { expected: usize, actual: usize },
    InvalidDescriptorLength { expected: usize, actual: usize },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::InvalidDimensions { width, height } => {
                write!(f, "Invalid grid dimensions: {}x{} (must be > 0)", width, height)
            }
            GridError::DataLengthMismatch { expected, actual } => {
                write!(f, "Grid data length mismatch: expected {}, got {}", expected, actual)
            }
            GridError::InvalidDescriptorLength { expected, actual } => {
                write!(f, "Descriptor length mismatch: expected {} bins, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for GridError {}

fn check_dimensions(width: usize, height: usize, len: usize) -> Result<(), GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::InvalidDimensions { width, height });
    }
    if len != width * height {
        return Err(GridError::DataLengthMismatch {
            expected: width * height,
            actual: len,
        });
    }
    Ok(())
}

/// Row-major 8-bit luminosity grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl IntensityGrid {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, GridError> {
        check_dimensions(width, height, data.len())?;
        Ok(Self { width, height, data })
    }

    /// Grid where every cell holds `value`
    pub fn filled(width: usize, height: usize, value: u8) -> Result<Self, GridError> {
        Self::new(width, height, vec![value; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// Two-class cell value. `Black` cells are at or below the binarization
/// threshold and make up the key silhouette; `White` cells are the light
/// background above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {
    Black,
    White,
}

impl Pixel {
    pub fn flipped(self) -> Self {
        match self {
            Pixel::Black => Pixel::White,
            Pixel::White => Pixel::Black,
        }
    }
}

/// Row-major two-class grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryGrid {
    width: usize,
    height: usize,
    cells: Vec<Pixel>,
}

impl BinaryGrid {
    pub fn new(width: usize, height: usize, cells: Vec<Pixel>) -> Result<Self, GridError> {
        check_dimensions(width, height, cells.len())?;
        Ok(Self { width, height, cells })
    }

    pub fn filled(width: usize, height: usize, value: Pixel) -> Result<Self, GridError> {
        Self::new(width, height, vec![value; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Pixel {
        self.cells[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: Pixel) {
        self.cells[y * self.width + x] = value;
    }

    /// Flat row-major view, the layout the cleaning passes scan
    pub fn cells(&self) -> &[Pixel] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Pixel] {
        &mut self.cells
    }

    pub fn count(&self, value: Pixel) -> usize {
        self.cells.iter().filter(|&&c| c == value).count()
    }
}

/// Integer pixel coordinate on a silhouette boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundaryPoint {
    pub x: usize,
    pub y: usize,
}

impl BoundaryPoint {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &BoundaryPoint) -> f64 {
        let dx = other.x as f64 - self.x as f64;
        let dy = other.y as f64 - self.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for BoundaryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Boundary points in row-major scan order: the first element is the
/// topmost point and the last element the bottommost.
pub type BoundarySet = Vec<BoundaryPoint>;

/// Log-polar histogram of `SAMPLE_POINTS x RADIAL_BINS x LOG_BINS` vote counts
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeDescriptor {
    bins: Vec<u32>,
}

impl Default for ShapeDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeDescriptor {
    pub const LEN: usize = SAMPLE_POINTS * BINS_PER_POINT;

    /// All-zero descriptor
    pub fn new() -> Self {
        Self {
            bins: vec![0; Self::LEN],
        }
    }

    pub fn from_bins(bins: Vec<u32>) -> Result<Self, GridError> {
        if bins.len() != Self::LEN {
            return Err(GridError::InvalidDescriptorLength {
                expected: Self::LEN,
                actual: bins.len(),
            });
        }
        Ok(Self { bins })
    }

    #[inline]
    fn index(point: usize, radial: usize, log: usize) -> usize {
        (point * RADIAL_BINS + radial) * LOG_BINS + log
    }

    #[inline]
    pub fn get(&self, point: usize, radial: usize, log: usize) -> u32 {
        self.bins[Self::index(point, radial, log)]
    }

    #[inline]
    pub fn set(&mut self, point: usize, radial: usize, log: usize, frequency: u32) {
        self.bins[Self::index(point, radial, log)] = frequency;
    }

    #[inline]
    pub fn increment(&mut self, point: usize, radial: usize, log: usize) {
        self.bins[Self::index(point, radial, log)] += 1;
    }

    /// The `RADIAL_BINS * LOG_BINS` cells belonging to one sampled point
    pub fn point_histogram(&self, point: usize) -> &[u32] {
        let start = point * BINS_PER_POINT;
        &self.bins[start..start + BINS_PER_POINT]
    }

    pub fn point_histogram_mut(&mut self, point: usize) -> &mut [u32] {
        let start = point * BINS_PER_POINT;
        &mut self.bins[start..start + BINS_PER_POINT]
    }

    /// Total votes cast for one sampled point
    pub fn point_total(&self, point: usize) -> u32 {
        self.point_histogram(point).iter().sum()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.bins
    }
}

/// Pipeline-wide runtime settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyConfig {
    pub n_threads: usize,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            n_threads: num_cpus::get().max(1),
        }
    }
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_rejects_zero_dimensions() {
        let result = IntensityGrid::new(0, 10, Vec::new());
        assert!(matches!(result, Err(GridError::InvalidDimensions { .. })));
        let result = BinaryGrid::filled(10, 0, Pixel::White);
        assert!(matches!(result, Err(GridError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_grid_rejects_wrong_length() {
        let result = IntensityGrid::new(4, 4, vec![0; 15]);
        assert_eq!(
            result,
            Err(GridError::DataLengthMismatch { expected: 16, actual: 15 })
        );
    }

    #[test]
    fn test_grid_indexing_is_row_major() {
        let grid = IntensityGrid::new(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(grid.get(2, 0), 2);
        assert_eq!(grid.get(0, 1), 3);
        assert_eq!(grid.get(2, 1), 5);
    }

    #[test]
    fn test_binary_grid_count() {
        let mut grid = BinaryGrid::filled(5, 5, Pixel::White).unwrap();
        grid.set(1, 1, Pixel::Black);
        grid.set(3, 4, Pixel::Black);
        assert_eq!(grid.count(Pixel::Black), 2);
        assert_eq!(grid.count(Pixel::White), 23);
        assert_eq!(grid.cells()[4 * 5 + 3], Pixel::Black);
    }

    #[test]
    fn test_descriptor_layout() {
        let mut d = ShapeDescriptor::new();
        d.increment(3, 11, 4);
        d.increment(3, 11, 4);
        d.set(0, 0, 0, 7);
        assert_eq!(d.get(3, 11, 4), 2);
        assert_eq!(d.point_total(3), 2);
        assert_eq!(d.point_histogram(3)[BINS_PER_POINT - 1], 2);
        assert_eq!(d.as_slice()[0], 7);

        d.point_histogram_mut(1)[5] = 3;
        assert_eq!(d.get(1, 1, 0), 3);
    }

    #[test]
    fn test_descriptor_from_bins_checks_length() {
        let result = ShapeDescriptor::from_bins(vec![0; 10]);
        assert!(matches!(result, Err(GridError::InvalidDescriptorLength { .. })));
    }

    #[test]
    fn test_point_distance() {
        let a = BoundaryPoint::new(1, 1);
        let b = BoundaryPoint::new(4, 5);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(format!("{}", a), "(1, 1)");
    }
}
