use std::path::PathBuf;

use kiln_scene::{GraphError, ImageError, SceneError};
use thiserror::Error;

/// Failure reported by a [`crate::Renderer`].
#[derive(Debug, Error)]
pub enum RenderError {
    /// Nothing is bound to the capture quad.
    #[error("capture quad has no material")]
    NoCaptureMaterial,

    /// The render target has a zero dimension.
    #[error("invalid render resolution {width}x{height}")]
    InvalidResolution {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The renderer could not write its output file.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Target file.
        path: PathBuf,
        /// Underlying image error.
        source: ImageError,
    },

    /// Backend-specific failure.
    #[error("renderer failed: {0}")]
    Backend(String),

    /// Scene lookup failed while rendering.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Errors that abort a bake pass.
#[derive(Debug, Error)]
pub enum BakeError {
    /// Rendering a material failed. The scene was restored before this was
    /// returned.
    #[error("render of `{material}` failed: {source}")]
    Render {
        /// Material being rendered.
        material: String,
        /// Renderer failure.
        source: RenderError,
    },

    /// A graph edit or its restoration failed.
    #[error("graph edit on `{owner}` failed: {source}")]
    Graph {
        /// Material or node group whose graph was edited.
        owner: String,
        /// Underlying graph error.
        source: GraphError,
    },

    /// The transparent material used to hide other slots is missing.
    #[error("neutral material `{0}` not found")]
    MissingNeutralMaterial(String),

    /// Scene lookup failure.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Image buffer or codec failure.
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest could not be parsed.
    #[error("failed to parse bake manifest: {0}")]
    ManifestParse(#[from] ron::error::SpannedError),

    /// Manifest could not be serialized.
    #[error("failed to serialize bake manifest: {0}")]
    ManifestWrite(#[from] ron::Error),
}
