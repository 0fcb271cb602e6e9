use std::path::PathBuf;

use thiserror::Error;

/// Result type used across the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
/// Everything that can go wrong while building, feeding or
/// persisting a network.
///
/// All of these are raised during session initialization. Once
/// training or running has started nothing in the library fails.
pub enum Error {
    #[error("invalid network topology: {0}")]
    InvalidTopology(String),

    #[error("expected {expected} weights, got {actual}")]
    InvalidWeights {
        expected: usize,
        actual: usize
    },

    #[error("invalid case set: {0}")]
    InvalidCases(String),

    #[error("configuration is missing required fields: {}", missing.join(", "))]
    ConfigIncomplete {
        missing: Vec<&'static str>
    },

    #[error("malformed configuration stream: {0}")]
    MalformedConfig(String),

    #[error("{path:?} has {actual} bytes, expected exactly {expected}")]
    DimensionMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64
    },

    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,

        #[source]
        source: std::io::Error
    },

    #[error("failed to parse json configuration: {0}")]
    Json(#[from] serde_json::Error)
}

impl Error {
    #[inline]
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source
        }
    }

    /// True when the error comes from a file whose length
    /// doesn't match the expected dimensions.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}
