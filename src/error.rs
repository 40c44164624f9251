//! Error types for dumpsplit.
//!
//! Splitting itself never fails; everything here belongs to reading dumps,
//! writing results and loading configuration.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for dumpsplit operations.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The input file does not exist.
    #[error("File '{}' not found", path.display())]
    NotFound { path: PathBuf },

    /// The input exists but could not be read.
    #[error("Error reading file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Strict UTF-8 decoding was requested and the input is not UTF-8.
    #[error("Could not decode file {} as UTF-8: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The output file could not be created or written.
    #[error("Could not write output file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unrecognised encoding name.
    #[error("Unknown encoding: '{0}'. Expected: auto, utf8, or latin1")]
    UnknownEncoding(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DumpError {
    /// Classify a read failure, splitting out the missing-file case.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Read { path, source }
        }
    }

    /// Create a write error for the given output path.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for dumpsplit operations.
pub type DumpResult<T> = Result<T, DumpError>;
