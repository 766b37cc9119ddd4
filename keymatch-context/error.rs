#[derive(Debug, Clone, PartialEq)]
pub enum ContextError {
    /// Too few boundary points to draw the fixed number of samples
    InsufficientPoints { found: usize, required: usize },
    EmptyReferenceSet,
    InvalidCost { row: usize, col: usize, value: f64 },
    DimensionMismatch { rows: usize, cols: usize },
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextError::InsufficientPoints { found, required } => {
                write!(f, "Insufficient boundary points: found {}, need at least {}", found, required)
            }
            ContextError::EmptyReferenceSet => write!(f, "Reference set contains no descriptors"),
            ContextError::InvalidCost { row, col, value } => {
                write!(f, "Invalid cost {} at ({}, {}): must be finite and non-negative", value, row, col)
            }
            ContextError::DimensionMismatch { rows, cols } => {
                write!(f, "Cost matrix must be square, got {}x{}", rows, cols)
            }
        }
    }
}

impl std::error::Error for ContextError {}

pub type ContextResult<T> = Result<T, ContextError>;
