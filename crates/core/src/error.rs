//! Error types for landsift

use thiserror::Error;

/// Main error type for landsift operations.
///
/// Every failure in the pipeline is fatal: stages propagate errors with `?`
/// and the run aborts, leaving already-written datasets in the workspace.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    #[error("Unsupported reprojection: {from} -> {to}")]
    UnsupportedReprojection { from: String, to: String },

    #[error("Layer '{0}' has no features")]
    EmptyLayer(String),

    #[error("Feature index {index} out of bounds in layer of {len} features")]
    FeatureOutOfBounds { index: usize, len: usize },

    #[error("Field '{0}' does not exist")]
    MissingField(String),

    #[error("Field '{0}' already exists")]
    FieldExists(String),

    #[error("Dataset '{0}' already exists and overwrite is disabled")]
    DatasetExists(String),

    #[error("Field '{field}' does not hold a {expected} value")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("No raster cells inside the clip extent")]
    NoCellsInExtent,

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for landsift operations
pub type Result<T> = std::result::Result<T, Error>;
