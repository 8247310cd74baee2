//! Error types for the simulation engine.
//!
//! Every failure here is fatal at startup: there are no transient or
//! retryable operations once a run has begun.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for grid construction, configuration and persistence.
#[derive(Error, Debug)]
pub enum LifeError {
    /// Grid side must be even so positions centre symmetrically
    #[error("grid side length must be even, got {0}")]
    OddGridSize(usize),

    #[error("grid side length must be non-zero")]
    EmptyGrid,

    #[error("grid side length {0} is too large")]
    GridTooLarge(usize),

    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// A saved automaton could not be read
    #[error("failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// Malformed NPY header or payload
    #[error("NPY format error: {0}")]
    Npy(String),

    #[error("expected a cubic 3-D array, got shape {0:?}")]
    ShapeMismatch(Vec<usize>),

    #[error("cell {index} holds {value}, expected 0 or 1")]
    NonBinaryCell { index: usize, value: f64 },

    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, LifeError>;

impl LifeError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new NPY format error.
    #[must_use]
    pub fn npy<S: Into<String>>(msg: S) -> Self {
        Self::Npy(msg.into())
    }

    /// Attaches the offending path, turning any error into a load error.
    #[must_use]
    pub fn while_loading(self, path: impl Into<PathBuf>) -> Self {
        match self {
            err @ LifeError::Load { .. } => err,
            other => Self::Load {
                path: path.into(),
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            LifeError::OddGridSize(7).to_string(),
            "grid side length must be even, got 7"
        );
        assert_eq!(
            LifeError::npy("bad magic").to_string(),
            "NPY format error: bad magic"
        );
    }

    #[test]
    fn test_while_loading_wraps_once() {
        let err = LifeError::npy("truncated").while_loading("a.npy");
        assert!(err.to_string().contains("a.npy"));
        assert!(err.to_string().contains("truncated"));

        let again = err.while_loading("b.npy");
        assert!(again.to_string().contains("a.npy"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LifeError = io_err.into();
        assert!(matches!(err, LifeError::Io(_)));
    }
}
