use crate::config::SilhouetteConfig;
use crate::error::SilhouetteResult;
use crate::extractor::SilhouetteExtractor;
use crate::types::{BoxFillMode, SmoothingRule};

/// Builder for creating a `SilhouetteExtractor`
#[derive(Debug, Clone, Default)]
pub struct SilhouetteBuilder {
    config: SilhouetteConfig,
}

impl SilhouetteBuilder {
    /// Create a new builder with the reference settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the luminosity histogram bin width
    pub fn bin_width(mut self, bin_width: u8) -> Self {
        self.config.bin_width = bin_width;
        self
    }

    /// Set the exclusive upper bound of the smoothing distance
    pub fn max_cleaning_distance(mut self, distance: usize) -> Self {
        self.config.max_cleaning_distance = distance;
        self
    }

    /// Choose where the horizontal smoothing test applies
    pub fn smoothing(mut self, rule: SmoothingRule) -> Self {
        self.config.smoothing = rule;
        self
    }

    /// Set the minimum box width and height kept by the box fill
    pub fn min_box(mut self, width: usize, height: usize) -> Self {
        self.config.min_box_width = width;
        self.config.min_box_height = height;
        self
    }

    pub fn box_fill(mut self, mode: BoxFillMode) -> Self {
        self.config.box_fill = mode;
        self
    }

    /// Cap the smoothing scans performed per distance
    pub fn max_smoothing_passes(mut self, passes: usize) -> Self {
        self.config.max_smoothing_passes = passes;
        self
    }

    pub fn blade_distance_threshold(mut self, threshold: f64) -> Self {
        self.config.blade_distance_threshold = threshold;
        self
    }

    pub fn blade_projection_length(mut self, length: usize) -> Self {
        self.config.blade_projection_length = length;
        self
    }

    pub fn angle_offset_threshold(mut self, threshold: f64) -> Self {
        self.config.angle_offset_threshold = threshold;
        self
    }

    /// Set the number of threads for parallel processing
    pub fn threads(mut self, n_threads: usize) -> Self {
        self.config.core.n_threads = n_threads;
        self
    }

    /// Apply the reference preset
    pub fn preset_reference(mut self) -> Self {
        let threads = self.config.core.n_threads;
        self.config = SilhouetteConfig::reference_preset();
        self.config.core.n_threads = threads;
        self
    }

    /// Apply the row-clipped box fill preset
    pub fn preset_row_clipped(mut self) -> Self {
        let threads = self.config.core.n_threads;
        self.config = SilhouetteConfig::row_clipped_preset();
        self.config.core.n_threads = threads;
        self
    }

    /// Validate and build the `SilhouetteExtractor`
    pub fn build(self) -> SilhouetteResult<SilhouetteExtractor> {
        SilhouetteExtractor::new(self.config)
    }

    /// Generate a summary of the builder's configuration
    pub fn summary(&self) -> String {
        self.config.summary()
    }

    /// Create a builder from an existing `SilhouetteConfig`
    pub fn from_config(config: SilhouetteConfig) -> Self {
        Self { config }
    }

    /// Convert the builder into a `SilhouetteConfig`
    pub fn to_config(self) -> SilhouetteConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SilhouetteError;
    use keymatch_core::{IntensityGrid, Pixel};

    #[test]
    fn test_builder_sets_fields() {
        let config = SilhouetteBuilder::new()
            .bin_width(4)
            .min_box(6, 8)
            .box_fill(BoxFillMode::RowClipped)
            .smoothing(SmoothingRule::Combined)
            .blade_projection_length(50)
            .threads(2)
            .to_config();
        assert_eq!(config.bin_width, 4);
        assert_eq!((config.min_box_width, config.min_box_height), (6, 8));
        assert_eq!(config.box_fill, BoxFillMode::RowClipped);
        assert_eq!(config.smoothing, SmoothingRule::Combined);
        assert_eq!(config.blade_projection_length, 50);
        assert_eq!(config.core.n_threads, 2);
    }

    #[test]
    fn test_uneven_bin_width_handles_near_white_image() {
        let extractor = SilhouetteBuilder::new().bin_width(4).build().unwrap();
        for luminosity in 252..=255 {
            let silhouette = extractor.extract(&IntensityGrid::filled(8, 8, luminosity).unwrap()).unwrap();
            assert_eq!(silhouette.threshold, None);
            assert_eq!(silhouette.cleaned.count(Pixel::White), 64);
            assert!(silhouette.boundary.is_empty());
        }
    }

    #[test]
    fn test_presets_keep_thread_count() {
        let config = SilhouetteBuilder::new().threads(3).preset_row_clipped().to_config();
        assert_eq!(config.core.n_threads, 3);
        assert_eq!(config.box_fill, BoxFillMode::RowClipped);
        assert_eq!(config.smoothing, SmoothingRule::Combined);
    }

    #[test]
    fn test_build_validates() {
        let result = SilhouetteBuilder::new().bin_width(0).build();
        assert!(matches!(result, Err(SilhouetteError::InvalidConfig(_))));
        assert!(SilhouetteBuilder::new().build().is_ok());
    }

    #[test]
    fn test_config_round_trip_through_builder() {
        let config = SilhouetteConfig::row_clipped_preset();
        let back = config.clone().to_builder().to_config();
        assert_eq!(back, config);
    }
}
