use thiserror::Error;

/// Custom error type for the patchnet framework.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum PatchNetError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Rank mismatch in {operation}: expected a {expected}-D tensor, got shape {actual:?}")]
    RankMismatch {
        expected: usize,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Invalid shape {shape:?}: tensors have 1 or 2 positive dimensions")]
    InvalidShape { shape: Vec<usize> },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Operator {operator} expects {expected} inputs, got {actual}")]
    ArityMismatch {
        operator: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown graph node {0}")]
    UnknownNode(usize),

    #[error("Gradient requested for a non-scalar node of shape {0:?}")]
    BackwardNonScalar(Vec<usize>),

    #[error("Parameter '{0}' already exists in this store")]
    DuplicateParameter(String),

    #[error("Parameter '{0}' not found")]
    UnknownParameter(String),

    #[error("Invalid checkpoint {path}: {reason}")]
    CheckpointFormat { path: String, reason: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid dataset {path}: {reason}")]
    DatasetFormat { path: String, reason: String },

    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl PatchNetError {
    /// Wraps an `std::io::Error` together with the path it was raised for.
    pub fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        PatchNetError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}
