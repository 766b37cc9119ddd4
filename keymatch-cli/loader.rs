use std::path::Path;

use image::GrayImage;
use keymatch_core::IntensityGrid;
use log::debug;
use crate::{KeyMatchError, KeyMatchResult};

/// Decode an image file of any supported format into 8-bit luminosity
pub fn load_intensity_grid<P: AsRef<Path>>(path: P) -> KeyMatchResult<IntensityGrid> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|source| KeyMatchError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?
        .to_luma8();

    let (width, height) = img.dimensions();
    debug!("loaded {} ({}x{})", path.display(), width, height);
    Ok(IntensityGrid::new(width as usize, height as usize, img.into_raw())?)
}

/// Copy a grid into an `image` buffer, `None` if it does not fit `u32` dimensions
pub fn to_gray_image(grid: &IntensityGrid) -> Option<GrayImage> {
    let width = u32::try_from(grid.width()).ok()?;
    let height = u32::try_from(grid.height()).ok()?;
    GrayImage::from_raw(width, height, grid.as_slice().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradient.png");

        let data: Vec<u8> = (0..12 * 7).map(|i| (i * 3) as u8).collect();
        let grid = IntensityGrid::new(12, 7, data).unwrap();
        to_gray_image(&grid).unwrap().save(&path).unwrap();

        assert_eq!(load_intensity_grid(&path).unwrap(), grid);
    }

    #[test]
    fn test_color_images_are_converted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("color.png");
        image::RgbImage::from_pixel(4, 3, image::Rgb([255, 255, 255])).save(&path).unwrap();

        let grid = load_intensity_grid(&path).unwrap();
        assert_eq!((grid.width(), grid.height()), (4, 3));
        assert!(grid.as_slice().iter().all(|&l| l == 255));
    }

    #[test]
    fn test_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.png");
        std::fs::write(&path, b"plain text").unwrap();
        assert!(matches!(load_intensity_grid(&path), Err(KeyMatchError::ImageLoad { .. })));
    }
}
