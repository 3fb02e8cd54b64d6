use std::path::PathBuf;

use kiln_atlas::AtlasError;
use kiln_bake::BakeError;
use kiln_config::ConfigError;
use kiln_scene::{ImageError, SceneError};
use thiserror::Error;

/// Every failure that stops the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The scene manifest could not be read.
    #[error("failed to read scene manifest {path}: {source}")]
    ManifestRead {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The scene manifest is not valid RON.
    #[error("failed to parse scene manifest {path}: {source}")]
    ManifestParse {
        /// Manifest path.
        path: PathBuf,
        /// Parser error with position.
        source: ron::error::SpannedError,
    },

    /// The baked scene could not be written.
    #[error("failed to write scene {path}: {source}")]
    SceneWrite {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The baked scene could not be serialized.
    #[error("failed to serialize scene: {0}")]
    SceneSerialize(#[source] ron::Error),

    /// Scene lookup failure.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Image load or write failure.
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    /// A bake pass failed.
    #[error("bake failed: {0}")]
    Bake(#[from] BakeError),

    /// The atlas could not be composed.
    #[error("atlas failed: {0}")]
    Atlas(#[from] AtlasError),
}
