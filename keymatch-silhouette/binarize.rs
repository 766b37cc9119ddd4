use keymatch_core::{BinaryGrid, IntensityGrid, Pixel};
use log::debug;
use crate::error::SilhouetteResult;

const MAX_LUMINOSITY: usize = 255;

/// Histogram-based two-class thresholding (Otsu's method over coarse bins)
pub struct Binarizer;

impl Binarizer {
    /// Number of histogram bins for a given bin width. Bin 0 is never filled.
    ///
    /// When `bin_width` does not divide 255 the shades just below white land
    /// one bin past pure white, so the length covers both.
    pub fn histogram_len(bin_width: u8) -> usize {
        let below_white = Self::histogram_bin(MAX_LUMINOSITY as u8 - 1, bin_width);
        let white = Self::histogram_bin(MAX_LUMINOSITY as u8, bin_width);
        below_white.max(white) + 1
    }

    /// Bin of a luminosity value: rounded up one bin, except pure white which
    /// stays in the last bin so near-white background shades share it.
    #[inline]
    pub fn histogram_bin(luminosity: u8, bin_width: u8) -> usize {
        let bin = luminosity as usize / bin_width as usize;
        if luminosity as usize == MAX_LUMINOSITY {
            bin
        } else {
            bin + 1
        }
    }

    pub fn luminosity_histogram(grid: &IntensityGrid, bin_width: u8) -> Vec<u64> {
        let mut histogram = vec![0u64; Self::histogram_len(bin_width)];
        for &luminosity in grid.as_slice() {
            histogram[Self::histogram_bin(luminosity, bin_width)] += 1;
        }
        histogram
    }

    /// Index maximizing the between-class variance, first index on ties.
    ///
    /// Class weights are normalized by the number of bins rather than the
    /// pixel count. Candidates leaving one
    /// class empty have no defined mean and are skipped, so a histogram with a
    /// single occupied bin yields `None`.
    pub fn otsu_index(histogram: &[u64]) -> Option<usize> {
        let bins = histogram.len() as f64;
        let total: f64 = histogram.iter().map(|&c| c as f64).sum();
        let total_moment: f64 = histogram
            .iter()
            .enumerate()
            .map(|(i, &c)| (i as u64 * c) as f64)
            .sum();

        let mut best: Option<(usize, f64)> = None;
        let mut sum_b = 0.0f64;
        let mut moment_b = 0.0f64;

        for t in 0..histogram.len() {
            if t > 0 {
                sum_b += histogram[t - 1] as f64;
                moment_b += ((t - 1) as u64 * histogram[t - 1]) as f64;
            }
            let sum_f = total - sum_b;
            if sum_b == 0.0 || sum_f == 0.0 {
                continue;
            }

            let w_b = sum_b / bins;
            let mu_b = moment_b / sum_b;
            let w_f = sum_f / bins;
            let mu_f = (total_moment - moment_b) / sum_f;

            let variance = w_b * w_f * (mu_b - mu_f) * (mu_b - mu_f);
            match best {
                Some((_, max)) if variance <= max => {}
                _ => best = Some((t, variance)),
            }
        }

        best.map(|(t, _)| t)
    }

    /// Gray-level threshold (`index * bin_width`), or `None` for a single-class histogram
    pub fn otsu_threshold(histogram: &[u64], bin_width: u8) -> Option<u8> {
        Self::otsu_index(histogram)
            .map(|t| (t * bin_width as usize).min(MAX_LUMINOSITY) as u8)
    }

    /// Classify every cell: above the threshold is `White`, the rest `Black`.
    /// Without a threshold every cell is `White`.
    pub fn binarize(grid: &IntensityGrid, bin_width: u8) -> SilhouetteResult<(BinaryGrid, Option<u8>)> {
        let histogram = Self::luminosity_histogram(grid, bin_width);
        let threshold = Self::otsu_threshold(&histogram, bin_width);
        debug!("otsu threshold: {:?}", threshold);

        let cells = grid
            .as_slice()
            .iter()
            .map(|&luminosity| match threshold {
                Some(t) if luminosity <= t => Pixel::Black,
                _ => Pixel::White,
            })
            .collect();

        let binary = BinaryGrid::new(grid.width(), grid.height(), cells)?;
        Ok((binary, threshold))
    }
}
