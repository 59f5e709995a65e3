//! Error taxonomy for the overmap pipeline.
//!
//! Everything here is fatal for the current run. Data-quality problems
//! (unknown terrain, unknown colours) never surface as errors; they fall back
//! and are tallied instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    /// IO error (file not found, permissions, etc.)
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file that had to be JSON was not
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// PNG encoding or image write failure
    #[error("image error at {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("database error: {0}")]
    Database(#[from] postgres::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Run-length counts of one chunk layer do not cover the layer exactly
    #[error("chunk ({x}, {y}) layer {layer}: run lengths sum to {total}, expected {expected}")]
    MalformedRuns {
        x: i32,
        y: i32,
        layer: usize,
        total: u64,
        expected: usize,
    },

    #[error("chunk ({x}, {y}) has {found} layers, expected {expected}")]
    LayerCount {
        x: i32,
        y: i32,
        found: usize,
        expected: usize,
    },

    #[error("layer {0} out of range (0-20)")]
    LayerOutOfRange(usize),

    #[error("directory not found: {0}")]
    MissingDirectory(PathBuf),
}

impl MapError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MapError::Io { path: path.into(), source }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        MapError::Json { path: path.into(), source }
    }

    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        MapError::Image { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
