//! Error types for flow generation and log joining.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PythiaError>;

/// Errors that can occur while generating a flow or joining logs.
///
/// Every variant is fatal to the run; nothing is retried.
#[derive(Debug, Error)]
pub enum PythiaError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A numbered simulation output does not exist
    #[error("Simulation output not found: {path}")]
    MissingInput { path: PathBuf },

    /// A `#` line whose remainder is not an integer
    #[error("Invalid event count in {path} line {line}: {text:?}")]
    InvalidCount {
        path: PathBuf,
        line: usize,
        text: String,
    },

    /// Summed event count no longer fits in an i64
    #[error("Event count overflow while reading {path}")]
    CountOverflow { path: PathBuf },

    /// Config file could not be decoded
    #[error("Config error: {0}")]
    Config(String),

    /// Command line was malformed
    #[error("Usage error: {0}")]
    Usage(String),
}

impl PythiaError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Maps an error from opening an input file.
    ///
    /// A `NotFound` becomes [`PythiaError::MissingInput`].
    pub fn open_input(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::MissingInput {
                path: path.as_ref().to_path_buf(),
            }
        } else {
            Self::io(path, source)
        }
    }

    /// Creates a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
