use kiln_scene::{GraphError, ImageError, SceneError};
use thiserror::Error;

/// Errors raised while compositing the atlas.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Buffer arithmetic or a missing image.
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    /// Scene lookup failure.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Errors that stop one material from being finalized.
#[derive(Debug, Error)]
pub enum FinalizeError {
    /// The template material is missing and could not be recreated.
    #[error("template `{template}` unavailable: {reason}")]
    TemplateUnavailable {
        /// Template material name.
        template: String,
        /// Why recreation failed.
        reason: String,
    },

    /// The template's texture group does not resolve to a node group.
    #[error("template `{0}` has no texture group tree")]
    TemplateTexturesMissing(String),

    /// The baked image is not in the image store.
    #[error("baked image `{0}` is not loaded")]
    MissingImage(String),

    /// Binding an image into the template failed.
    #[error("graph error on `{material}`: {source}")]
    Graph {
        /// Material being finalized.
        material: String,
        /// Underlying graph error.
        source: GraphError,
    },

    /// Scene lookup failure.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}
