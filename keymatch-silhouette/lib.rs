//! Turns a photographed key into a cleaned boundary point set.
//!
//! The stages run in a fixed order: Otsu binarization, contagion smoothing
//! and box fill, boundary tracing, and blade/teeth normalization.

pub mod binarize;
pub mod builder;
pub mod cleaning;
pub mod config;
pub mod edges;
pub mod error;
pub mod extractor;
pub mod geometry;
pub mod observer;
pub mod types;

pub use binarize::Binarizer;
pub use builder::SilhouetteBuilder;
pub use cleaning::SilhouetteCleaner;
pub use config::SilhouetteConfig;
pub use edges::EdgeExtractor;
pub use error::{SilhouetteError, SilhouetteResult};
pub use extractor::SilhouetteExtractor;
pub use geometry::{GeometricNormalizer, ProjectedLine};
pub use observer::{NoopObserver, StageObserver};
pub use types::{BoxFillMode, KeyGeometry, Silhouette, SmoothingRule};
