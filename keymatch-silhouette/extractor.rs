use keymatch_core::IntensityGrid;
use log::info;
use crate::binarize::Binarizer;
use crate::cleaning::SilhouetteCleaner;
use crate::config::SilhouetteConfig;
use crate::edges::EdgeExtractor;
use crate::error::SilhouetteResult;
use crate::geometry::GeometricNormalizer;
use crate::observer::{NoopObserver, StageObserver};
use crate::types::Silhouette;

/// Runs binarization, cleaning, edge extraction and normalization in order.
#[derive(Debug, Clone)]
pub struct SilhouetteExtractor {
    config: SilhouetteConfig,
    cleaner: SilhouetteCleaner,
    normalizer: GeometricNormalizer,
}

impl SilhouetteExtractor {
    /// Creates an extractor after validating `config`
    pub fn new(config: SilhouetteConfig) -> SilhouetteResult<Self> {
        config.validate()?;
        Ok(Self {
            cleaner: SilhouetteCleaner::new(&config),
            normalizer: GeometricNormalizer::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &SilhouetteConfig {
        &self.config
    }

    pub fn extract(&self, grid: &IntensityGrid) -> SilhouetteResult<Silhouette> {
        self.extract_with_observer(grid, &mut NoopObserver)
    }

    /// Same as [`extract`](Self::extract), reporting every intermediate
    /// result to `observer`.
    pub fn extract_with_observer<O>(&self, grid: &IntensityGrid, observer: &mut O) -> SilhouetteResult<Silhouette>
    where
        O: StageObserver + ?Sized,
    {
        observer.grayscale(grid);

        let (mut binary, threshold) = Binarizer::binarize(grid, self.config.bin_width)?;
        observer.binarized(&binary, threshold);

        self.cleaner.clean(&mut binary);
        observer.cleaned(&binary);

        let boundary = EdgeExtractor::find_edges(&binary);
        let right_edge = EdgeExtractor::right_edge(&boundary);
        info!(
            "{}x{} image: {} boundary points, {} right-edge points",
            grid.width(),
            grid.height(),
            boundary.len(),
            right_edge.len()
        );
        observer.boundary(&boundary, &right_edge);

        let geometry = self.normalizer.analyze(&boundary, &right_edge);
        let edges = match &geometry {
            Some(geometry) => {
                let edges = GeometricNormalizer::clean_edges(geometry.center, &boundary);
                observer.normalized(geometry, &edges);
                edges
            }
            None => Vec::new(),
        };

        Ok(Silhouette {
            threshold,
            cleaned: binary,
            boundary,
            right_edge,
            geometry,
            edges,
        })
    }
}
