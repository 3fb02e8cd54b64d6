//! The kiln bake pipeline as a library, plus scene manifest loading for the
//! `kiln` binary.

mod error;
mod manifest;
mod pipeline;

pub use error::PipelineError;
pub use manifest::{BAKED_SCENE_FILE_NAME, ImageSource, SceneManifest, save_scene};
pub use pipeline::{PipelineReport, run_pipeline};
