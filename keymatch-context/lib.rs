//! Shape-context descriptors and assignment-based matching.

pub mod assignment;
pub mod cost;
pub mod descriptor;
pub mod error;
pub mod matcher;

pub use assignment::{solve, Assignment};
pub use cost::{chi_squared, CostMatrix};
pub use descriptor::{ShapeDescriptorBuilder, LOG_SCALE_FACTOR};
pub use error::{ContextError, ContextResult};
pub use matcher::{MatchCandidate, MatchOutcome, Matcher};
