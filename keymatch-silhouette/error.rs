use keymatch_core::GridError;

#[derive(Debug, Clone, PartialEq)]
pub enum SilhouetteError {
    Grid(GridError),
    InvalidConfig(String),
}

impl std::fmt::Display for SilhouetteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SilhouetteError::Grid(e) => write!(f, "Grid error: {}", e),
            SilhouetteError::InvalidConfig(reason) => {
                write!(f, "Invalid silhouette configuration: {}", reason)
            }
        }
    }
}

impl std::error::Error for SilhouetteError {}

impl From<GridError> for SilhouetteError {
    fn from(err: GridError) -> Self {
        SilhouetteError::Grid(err)
    }
}

pub type SilhouetteResult<T> = Result<T, SilhouetteError>;
