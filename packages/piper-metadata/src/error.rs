//! Error handling for piper-metadata
//!
//! Every failure carries the path it happened on so the CLI can print a
//! single actionable line before exiting.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for all piper-metadata operations
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Voice configuration (`.onnx.json`) errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Configuration {path} must contain a JSON object at the top level")]
    NotAnObject { path: PathBuf },
}

/// ONNX model container errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Cannot read model {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a valid ONNX model: {source}")]
    Decode {
        path: PathBuf,
        source: prost::DecodeError,
    },

    #[error("Cannot write model {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot replace model {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PatchError>;

/// Helper trait for attaching a path to `std::io::Error`
pub trait IoErrorExt<T> {
    fn with_path<E>(self, path: impl Into<PathBuf>, kind: fn(PathBuf, std::io::Error) -> E)
    -> std::result::Result<T, E>;
}

impl<T> IoErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn with_path<E>(
        self,
        path: impl Into<PathBuf>,
        kind: fn(PathBuf, std::io::Error) -> E,
    ) -> std::result::Result<T, E> {
        self.map_err(|source| kind(path.into(), source))
    }
}

impl ConfigError {
    pub(crate) fn read(path: PathBuf, source: std::io::Error) -> Self {
        Self::Read { path, source }
    }
}

impl ModelError {
    pub(crate) fn read(path: PathBuf, source: std::io::Error) -> Self {
        Self::Read { path, source }
    }

    pub(crate) fn write(path: PathBuf, source: std::io::Error) -> Self {
        Self::Write { path, source }
    }

    pub(crate) fn persist(path: PathBuf, source: std::io::Error) -> Self {
        Self::Persist { path, source }
    }
}
