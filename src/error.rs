//! Error types for the bubblewave core.
//!
//! Only programmer mistakes and configuration I/O surface as errors.
//! Degenerate runtime data (bad index, broken settings) is logged and
//! answered with a safe default instead, and validation findings are
//! returned as data in a `ValidationResult`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the bubblewave core.
#[derive(Error, Debug)]
pub enum WaveError {
    /// A batch call received parallel arrays of different lengths
    #[error("mismatched batch lengths: {indices} indices but {offsets} distance offsets")]
    MismatchedLengths { indices: usize, offsets: usize },

    /// Config file could not be read or written
    #[error("config IO for {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid TOML for `SimulationConfig`
    #[error("config parse error in {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Settings could not be rendered as TOML
    #[error("config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, WaveError>;
