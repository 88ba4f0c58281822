//! Error types for rust_zpca

use thiserror::Error;

/// Main error type for normalization and component analysis
#[derive(Error, Debug)]
pub enum ZpcaError {
    #[error("Missing column '{column}' in length table")]
    MissingColumn { column: String },

    #[error("Too few samples for PCA: {n_samples} sample(s), at least 2 required")]
    TooFewSamples { n_samples: usize },

    #[error("Insufficient dimensionality: requested {requested} components, data supports at most {max}")]
    InsufficientDimensionality { requested: usize, max: usize },

    #[error("Input contains NaN or infinite values; component analysis is undefined")]
    NonFiniteInput,

    #[error("Invalid matrix: {reason}")]
    InvalidMatrix { reason: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for rust_zpca operations
pub type Result<T> = std::result::Result<T, ZpcaError>;
