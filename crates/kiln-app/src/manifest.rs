//! Scene manifests: a RON scene description plus the image files it binds.

use std::path::{Path, PathBuf};

use kiln_config::NamingConfig;
use kiln_scene::{Material, Scene, ShaderGraph};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PipelineError;

/// File written next to the baked images once the pipeline finishes.
pub const BAKED_SCENE_FILE_NAME: &str = "baked-scene.ron";

/// An image to load into the store before baking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    /// Name the graph bindings use.
    pub name: String,
    /// PNG path, relative to the manifest unless absolute.
    pub path: PathBuf,
}

/// Everything the binary needs to rebuild a scene.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneManifest {
    /// Materials, surfaces and node groups.
    #[serde(default)]
    pub scene: Scene,
    /// Images referenced by the graphs.
    #[serde(default)]
    pub images: Vec<ImageSource>,
}

impl SceneManifest {
    /// Parses the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path).map_err(|source| {
            PipelineError::ManifestRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let manifest: Self =
            ron::from_str(&contents).map_err(|source| PipelineError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            "Loaded scene manifest {} ({} materials, {} surfaces, {} images)",
            path.display(),
            manifest.scene.materials.len(),
            manifest.scene.surfaces.len(),
            manifest.images.len()
        );
        Ok(manifest)
    }

    /// Builds the scene: loads every image relative to `base_dir` and adds
    /// an empty neutral material if the scene has none.
    pub fn into_scene(self, base_dir: &Path, naming: &NamingConfig) -> Result<Scene, PipelineError> {
        let mut scene = self.scene;
        for source in &self.images {
            let path = if source.path.is_absolute() {
                source.path.clone()
            } else {
                base_dir.join(&source.path)
            };
            let asset = scene.images.load_png(&source.name, &path)?;
            let (width, height) = asset.dimensions();
            debug!("Loaded {} ({width}x{height})", source.name);
        }

        if scene.material_id(&naming.neutral_material).is_none() {
            info!(
                "Scene has no {}, adding an empty one",
                naming.neutral_material
            );
            scene.add_material(Material::new(
                naming.neutral_material.as_str(),
                ShaderGraph::new(),
            ));
        }
        Ok(scene)
    }
}

/// Writes the scene description (without image data) to `path`.
pub fn save_scene(scene: &Scene, path: &Path) -> Result<(), PipelineError> {
    let contents = ron::ser::to_string_pretty(scene, PrettyConfig::default())
        .map_err(PipelineError::SceneSerialize)?;
    std::fs::write(path, contents).map_err(|source| PipelineError::SceneWrite {
        path: path.to_path_buf(),
        source,
    })
}
