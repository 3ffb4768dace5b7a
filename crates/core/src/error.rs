//! Error types for climb

use thiserror::Error;

/// Main error type for climb operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pre-flight validation failure, raised before any feature is read.
    #[error("{0}")]
    Configuration(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Drape failed: {0}")]
    Drape(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Whether this error was raised by pre-flight validation
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_) | Error::MissingParameter(_) | Error::InvalidParameter { .. }
        )
    }
}

/// Result type alias for climb operations
pub type Result<T> = std::result::Result<T, Error>;
