//! Fingerprints of baked files, persisted next to them.
//!
//! A file is reused only while the procedural configuration that produced it
//! is unchanged. Files without a recorded fingerprint are trusted so that
//! output directories from older runs still resume.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use kiln_config::NamingConfig;
use kiln_scene::{MaterialId, NodeKind, OutputDir, Scene, SceneError, ShaderGraph, SocketValue};
use ron::ser::PrettyConfig;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BakeError;
use crate::pass::PassType;

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE_NAME: &str = "bake-manifest.ron";

/// Output file name → fingerprint of the configuration that produced it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakeManifest {
    entries: BTreeMap<String, u64>,
}

impl BakeManifest {
    /// Reads the manifest from `dir`, or returns an empty one if absent.
    pub fn load(dir: &OutputDir) -> Result<Self, BakeError> {
        let path = dir.file_path(MANIFEST_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        let manifest: Self = ron::from_str(&contents)?;
        debug!(
            "Loaded bake manifest {} ({} entries)",
            path.display(),
            manifest.len()
        );
        Ok(manifest)
    }

    /// Writes the manifest into `dir`.
    pub fn save(&self, dir: &OutputDir) -> Result<(), BakeError> {
        std::fs::create_dir_all(dir.path())?;
        let contents = ron::ser::to_string_pretty(self, PrettyConfig::default())?;
        std::fs::write(dir.file_path(MANIFEST_FILE_NAME), contents)?;
        Ok(())
    }

    /// Recorded fingerprint for `file_name`.
    pub fn get(&self, file_name: &str) -> Option<u64> {
        self.entries.get(file_name).copied()
    }

    /// Records the fingerprint of a freshly written file.
    pub fn record(&mut self, file_name: impl Into<String>, fingerprint: u64) {
        self.entries.insert(file_name.into(), fingerprint);
    }

    /// `true` unless a different fingerprint is recorded for `file_name`.
    pub fn accepts(&self, file_name: &str, fingerprint: u64) -> bool {
        self.get(file_name).is_none_or(|recorded| recorded == fingerprint)
    }

    /// Number of recorded files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deterministic hash of everything that shapes a material's bake: its graph
/// (minus the marker weight), its texture group tree, the bound image sizes,
/// the pass and the render resolution.
pub fn fingerprint(
    scene: &Scene,
    material: MaterialId,
    pass: PassType,
    resolution: (u32, u32),
    naming: &NamingConfig,
) -> Result<u64, SceneError> {
    let mut hasher = FxHasher::default();
    let graph = &scene.material(material)?.graph;
    hash_graph(
        &mut hasher,
        graph,
        Some((naming.marker_node.as_str(), naming.marker_input.as_str())),
    );

    if let Some(tree) = graph.group_tree(&naming.texture_group_node) {
        tree.hash(&mut hasher);
        if let Some(group) = scene.node_group(tree) {
            hash_graph(&mut hasher, group, None);
        }
    }

    for image in scene.bound_images(material, &naming.texture_group_node)? {
        image.hash(&mut hasher);
        scene
            .images
            .get(&image)
            .map(|asset| asset.dimensions())
            .hash(&mut hasher);
    }

    pass.hash(&mut hasher);
    resolution.hash(&mut hasher);
    Ok(hasher.finish())
}

fn hash_graph(hasher: &mut FxHasher, graph: &ShaderGraph, skip_input: Option<(&str, &str)>) {
    for node in &graph.nodes {
        node.name.hash(hasher);
        match &node.kind {
            NodeKind::Image { image } => {
                0u8.hash(hasher);
                image.hash(hasher);
            }
            NodeKind::Group { tree } => {
                1u8.hash(hasher);
                tree.hash(hasher);
            }
            NodeKind::Generic => 2u8.hash(hasher),
        }
        for socket in &node.inputs {
            if skip_input == Some((node.name.as_str(), socket.name.as_str())) {
                continue;
            }
            socket.name.hash(hasher);
            hash_value(hasher, &socket.value);
        }
        node.outputs.hash(hasher);
    }
    let mut links: Vec<_> = graph.links.iter().collect();
    links.sort_by(|a, b| (&a.to_node, &a.to_socket).cmp(&(&b.to_node, &b.to_socket)));
    for link in links {
        link.from_node.hash(hasher);
        link.from_socket.hash(hasher);
        link.to_node.hash(hasher);
        link.to_socket.hash(hasher);
    }
}

fn hash_value(hasher: &mut FxHasher, value: &SocketValue) {
    match value {
        SocketValue::Float(v) => {
            0u8.hash(hasher);
            v.to_bits().hash(hasher);
        }
        SocketValue::Color(c) => {
            1u8.hash(hasher);
            c.map(f32::to_bits).hash(hasher);
        }
        SocketValue::Vector(v) => {
            2u8.hash(hasher);
            v.map(f32::to_bits).hash(hasher);
        }
    }
}
