use std::path::{Path, PathBuf};

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use keymatch_core::{BinaryGrid, BoundarySet, IntensityGrid, Pixel};
use keymatch_silhouette::{KeyGeometry, StageObserver};
use log::{debug, warn};
use crate::KeyMatchResult;
use crate::loader::to_gray_image;

pub const GRAYSCALE_FILE: &str = "grayscale.png";
pub const BINARY_FILE: &str = "binary.png";
pub const CLEANED_FILE: &str = "cleaned_binary.png";
pub const GEOMETRY_FILE: &str = "geometry.png";

const BLADE_ROW_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BLADE_COLUMN_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const CENTER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const EDGE_COLOR: Rgb<u8> = Rgb([255, 160, 0]);

/// Stage observer that writes every intermediate result as a PNG.
///
/// Write failures are logged and otherwise ignored.
pub struct DebugImageWriter {
    dir: PathBuf,
    grayscale: Option<GrayImage>,
}

impl DebugImageWriter {
    /// Writer targeting `dir`, created if missing
    pub fn new<P: AsRef<Path>>(dir: P) -> KeyMatchResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, grayscale: None })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn save_gray(&self, img: &GrayImage, name: &str) {
        let path = self.dir.join(name);
        match img.save(&path) {
            Ok(()) => debug!("wrote {}", path.display()),
            Err(e) => warn!("unable to write {}: {}", path.display(), e),
        }
    }

    fn binary_image(grid: &BinaryGrid) -> Option<GrayImage> {
        let width = u32::try_from(grid.width()).ok()?;
        let height = u32::try_from(grid.height()).ok()?;
        Some(GrayImage::from_fn(width, height, |x, y| match grid.get(x as usize, y as usize) {
            Pixel::Black => Luma([0]),
            Pixel::White => Luma([255]),
        }))
    }

    fn save_binary(&self, grid: &BinaryGrid, name: &str) {
        match Self::binary_image(grid) {
            Some(img) => self.save_gray(&img, name),
            None => warn!("binary grid too large to write as {}", name),
        }
    }

    /// Grayscale input with the blade beginning row and column, the key
    /// center column and the retained boundary drawn on top
    fn geometry_overlay(grayscale: &GrayImage, geometry: &KeyGeometry, edges: &BoundarySet) -> RgbImage {
        let mut canvas = image::DynamicImage::ImageLuma8(grayscale.clone()).into_rgb8();
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let blade = geometry.blade_beginning;
        let center = geometry.center;

        draw_line_segment_mut(&mut canvas, (0.0, blade.y as f32), (w - 1.0, blade.y as f32), BLADE_ROW_COLOR);
        draw_line_segment_mut(&mut canvas, (blade.x as f32, 0.0), (blade.x as f32, h - 1.0), BLADE_COLUMN_COLOR);
        draw_line_segment_mut(&mut canvas, (center.x as f32, 0.0), (center.x as f32, h - 1.0), CENTER_COLOR);

        for p in edges {
            if let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y)) {
                if x < canvas.width() && y < canvas.height() {
                    canvas.put_pixel(x, y, EDGE_COLOR);
                }
            }
        }
        canvas
    }
}

impl StageObserver for DebugImageWriter {
    fn grayscale(&mut self, grid: &IntensityGrid) {
        match to_gray_image(grid) {
            Some(img) => {
                self.save_gray(&img, GRAYSCALE_FILE);
                self.grayscale = Some(img);
            }
            None => warn!("intensity grid too large to write as {}", GRAYSCALE_FILE),
        }
    }

    fn binarized(&mut self, grid: &BinaryGrid, _threshold: Option<u8>) {
        self.save_binary(grid, BINARY_FILE);
    }

    fn cleaned(&mut self, grid: &BinaryGrid) {
        self.save_binary(grid, CLEANED_FILE);
    }

    fn normalized(&mut self, geometry: &KeyGeometry, edges: &BoundarySet) {
        let Some(grayscale) = &self.grayscale else {
            return;
        };
        let overlay = Self::geometry_overlay(grayscale, geometry, edges);
        let path = self.dir.join(GEOMETRY_FILE);
        if let Err(e) = overlay.save(&path) {
            warn!("unable to write {}: {}", path.display(), e);
        }
    }
}
