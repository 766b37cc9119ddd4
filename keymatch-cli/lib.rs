use std::path::{Path, PathBuf};

use keymatch_context::{ContextError, MatchOutcome, Matcher, ShapeDescriptorBuilder};
use keymatch_core::{init_thread_pool, GridError, IntensityGrid, ShapeDescriptor};
use keymatch_silhouette::{
    NoopObserver, Silhouette, SilhouetteBuilder, SilhouetteConfig, SilhouetteError, SilhouetteExtractor,
    StageObserver,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub mod database;
pub mod debug;
pub mod loader;

pub use database::ReferenceDatabase;
pub use debug::DebugImageWriter;
pub use loader::{load_intensity_grid, to_gray_image};
pub use keymatch_context::{self, MatchOutcome as Outcome};
pub use keymatch_core::{self, BoundaryPoint, ShapeDescriptor as Descriptor};
pub use keymatch_silhouette::{self, SilhouetteConfig as Config};

#[derive(Debug)]
pub enum KeyMatchError {
    ImageLoad { path: PathBuf, source: image::ImageError },
    Io(std::io::Error),
    Database { line: usize, message: String },
    Silhouette(SilhouetteError),
    Context(ContextError),
    Grid(GridError),
    Config(String),
}

impl std::fmt::Display for KeyMatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyMatchError::ImageLoad { path, source } => {
                write!(f, "Unable to load image {}: {}", path.display(), source)
            }
            KeyMatchError::Io(e) => write!(f, "I/O error: {}", e),
            KeyMatchError::Database { line, message } => {
                write!(f, "Descriptor database error on line {}: {}", line, message)
            }
            KeyMatchError::Silhouette(e) => write!(f, "Silhouette error: {}", e),
            KeyMatchError::Context(e) => write!(f, "Shape context error: {}", e),
            KeyMatchError::Grid(e) => write!(f, "Grid error: {}", e),
            KeyMatchError::Config(reason) => write!(f, "Configuration error: {}", reason),
        }
    }
}

impl std::error::Error for KeyMatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KeyMatchError::ImageLoad { source, .. } => Some(source),
            KeyMatchError::Io(e) => Some(e),
            KeyMatchError::Silhouette(e) => Some(e),
            KeyMatchError::Context(e) => Some(e),
            KeyMatchError::Grid(e) => Some(e),
            KeyMatchError::Database { .. } | KeyMatchError::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for KeyMatchError {
    fn from(err: std::io::Error) -> Self {
        KeyMatchError::Io(err)
    }
}

impl From<SilhouetteError> for KeyMatchError {
    fn from(err: SilhouetteError) -> Self {
        KeyMatchError::Silhouette(err)
    }
}

impl From<ContextError> for KeyMatchError {
    fn from(err: ContextError) -> Self {
        KeyMatchError::Context(err)
    }
}

impl From<GridError> for KeyMatchError {
    fn from(err: GridError) -> Self {
        KeyMatchError::Grid(err)
    }
}

pub type KeyMatchResult<T> = Result<T, KeyMatchError>;

/// Settings read from a `keymatch` TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMatchConfig {
    pub silhouette: SilhouetteConfig,
    /// Database used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Directory for stage images when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_dir: Option<PathBuf>,
}

impl KeyMatchConfig {
    pub fn from_toml(toml_str: &str) -> KeyMatchResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| KeyMatchError::Config(e.to_string()))?;
        config.silhouette.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> KeyMatchResult<String> {
        toml::to_string_pretty(self).map_err(|e| KeyMatchError::Config(e.to_string()))
    }

    pub fn load_toml<P: AsRef<Path>>(path: P) -> KeyMatchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Silhouette and descriptor computed for one image
#[derive(Debug, Clone)]
pub struct KeyDescription {
    pub silhouette: Silhouette,
    pub descriptor: ShapeDescriptor,
}

/// High-level key matcher combining silhouette extraction, shape contexts
/// and assignment-based matching
pub struct KeyMatcher {
    extractor: SilhouetteExtractor,
}

impl KeyMatcher {
    /// Create a matcher and size the global thread pool from `config`.
    /// A pool that is already running is kept as is.
    pub fn new(config: SilhouetteConfig) -> KeyMatchResult<Self> {
        let extractor = SilhouetteExtractor::new(config)?;
        if let Err(e) = init_thread_pool(extractor.config().core.n_threads) {
            debug!("keeping existing thread pool: {}", e);
        }
        info!("{}", extractor.config().summary());
        info!("running on {} worker threads", rayon::current_num_threads());
        Ok(Self { extractor })
    }

    pub fn from_builder(builder: SilhouetteBuilder) -> KeyMatchResult<Self> {
        Self::new(builder.to_config())
    }

    pub fn config(&self) -> &SilhouetteConfig {
        self.extractor.config()
    }

    pub fn describe(&self, grid: &IntensityGrid) -> KeyMatchResult<ShapeDescriptor> {
        Ok(self.describe_with_observer(grid, &mut NoopObserver)?.descriptor)
    }

    /// Run the full extraction, reporting each silhouette stage to `observer`
    pub fn describe_with_observer<O>(&self, grid: &IntensityGrid, observer: &mut O) -> KeyMatchResult<KeyDescription>
    where
        O: StageObserver + ?Sized,
    {
        let silhouette = self.extractor.extract_with_observer(grid, observer)?;
        let descriptor = ShapeDescriptorBuilder::build(&silhouette.edges)?;
        Ok(KeyDescription { silhouette, descriptor })
    }

    pub fn describe_file<P: AsRef<Path>>(&self, path: P) -> KeyMatchResult<ShapeDescriptor> {
        let grid = load_intensity_grid(path)?;
        self.describe(&grid)
    }

    /// Describe `grid` and find the closest entry of `references`
    pub fn match_grid(&self, grid: &IntensityGrid, references: &[ShapeDescriptor]) -> KeyMatchResult<MatchOutcome> {
        let descriptor = self.describe(grid)?;
        Ok(Matcher::match_key(&descriptor, references)?)
    }

    pub fn match_file<P: AsRef<Path>>(&self, path: P, database: &ReferenceDatabase) -> KeyMatchResult<MatchOutcome> {
        let grid = load_intensity_grid(path)?;
        self.match_grid(&grid, database.descriptors())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::{key_image, key_set};
    use keymatch_core::SAMPLE_POINTS;

    fn matcher() -> KeyMatcher {
        let _ = env_logger::builder().is_test(true).try_init();
        KeyMatcher::new(SilhouetteConfig::default()).unwrap()
    }

    #[test]
    fn test_descriptor_point_totals() {
        let descriptor = matcher().describe(&key_image(60, 100, 30, 150)).unwrap();
        for i in 0..SAMPLE_POINTS {
            assert_eq!(descriptor.point_total(i), (SAMPLE_POINTS - 1) as u32);
        }
    }

    #[test]
    fn test_query_matches_its_own_entry() {
        let matcher = matcher();
        let keys = key_set();
        let references: Vec<ShapeDescriptor> = keys.iter().map(|k| matcher.describe(k).unwrap()).collect();

        let outcome = matcher.match_grid(&keys[2], &references).unwrap();
        assert_eq!(outcome.best_index, 2);
        assert_eq!(outcome.best_cost(), 0.0);
        assert_eq!(outcome.costs.len(), 4);
    }

    #[test]
    fn test_blank_image_reports_insufficient_points() {
        let grid = IntensityGrid::filled(100, 100, 255).unwrap();
        let result = matcher().describe(&grid);
        assert!(matches!(
            result,
            Err(KeyMatchError::Context(ContextError::InsufficientPoints { found: 0, required: SAMPLE_POINTS }))
        ));
    }

    #[test]
    fn test_missing_image_is_a_load_error() {
        let result = matcher().describe_file("/nonexistent/dir/key.png");
        match result {
            Err(KeyMatchError::ImageLoad { path, .. }) => assert_eq!(path, PathBuf::from("/nonexistent/dir/key.png")),
            other => panic!("expected an image load error, got {:?}", other),
        }
    }

    #[test]
    fn test_match_file_against_saved_database() {
        let matcher = matcher();
        let dir = tempfile::tempdir().unwrap();
        let keys = key_set();

        let mut database = ReferenceDatabase::new();
        for key in &keys {
            database.push(matcher.describe(key).unwrap());
        }
        let db_path = dir.path().join("keys.csv");
        database.save(&db_path).unwrap();

        let image_path = dir.path().join("query.png");
        to_gray_image(&keys[1]).unwrap().save(&image_path).unwrap();

        let loaded = ReferenceDatabase::load(&db_path).unwrap();
        let outcome = matcher.match_file(&image_path, &loaded).unwrap();
        assert_eq!(outcome.best_index, 1);
        assert_eq!(outcome.best_cost(), 0.0);
    }

    #[test]
    fn test_config_toml() {
        let config = KeyMatchConfig::from_toml(
            "database = \"keys.csv\"\n\n[silhouette]\nbin_width = 4\nbox_fill = \"row_clipped\"\n",
        )
        .unwrap();
        assert_eq!(config.database, Some(PathBuf::from("keys.csv")));
        assert_eq!(config.silhouette.bin_width, 4);
        assert_eq!(config.silhouette.min_box_width, 10);

        let text = config.to_toml().unwrap();
        assert_eq!(KeyMatchConfig::from_toml(&text).unwrap(), config);

        assert!(matches!(
            KeyMatchConfig::from_toml("[silhouette]\nbin_width = 0\n"),
            Err(KeyMatchError::Silhouette(SilhouetteError::InvalidConfig(_)))
        ));
        assert!(matches!(KeyMatchConfig::from_toml("silhouette = 3"), Err(KeyMatchError::Config(_))));
    }
}
