//! Materials, mesh surfaces, and the scene that owns them.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::graph::{GraphError, ShaderGraph};
use crate::raster::{ImageError, ImageStore};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Index of a material in [`Scene::materials`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub u32);

/// Index of a surface in [`Scene::surfaces`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u32);

// ---------------------------------------------------------------------------
// SceneError
// ---------------------------------------------------------------------------

/// Errors returned by scene lookups and edits.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Material id out of range.
    #[error("unknown material id {0:?}")]
    UnknownMaterial(MaterialId),

    /// No material with this name.
    #[error("material `{0}` not found")]
    MaterialNotFound(String),

    /// Surface id out of range.
    #[error("unknown surface id {0:?}")]
    UnknownSurface(SurfaceId),

    /// No surface with this name.
    #[error("surface `{0}` not found")]
    SurfaceNotFound(String),

    /// No node group with this name.
    #[error("node group `{0}` not found")]
    NodeGroupNotFound(String),

    /// Shader graph failure.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// Image failure.
    #[error("image error: {0}")]
    Image(#[from] ImageError),
}

// ---------------------------------------------------------------------------
// Material
// ---------------------------------------------------------------------------

/// How a material composites alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    /// Alpha ignored.
    Opaque,
    /// Alpha-tested cutout.
    #[default]
    Clip,
    /// Sorted alpha blending.
    AlphaBlend,
}

/// A named material and its shader graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material name.
    pub name: String,
    /// Procedural shader graph.
    #[serde(default)]
    pub graph: ShaderGraph,
    /// Alpha compositing mode.
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// Kept in the scene even when no slot references it.
    #[serde(default)]
    pub keep_alive: bool,
}

impl Material {
    /// A material with the given graph and default settings.
    pub fn new(name: impl Into<String>, graph: ShaderGraph) -> Self {
        Self {
            name: name.into(),
            graph,
            blend_mode: BlendMode::default(),
            keep_alive: false,
        }
    }
}

// ---------------------------------------------------------------------------
// MeshSurface
// ---------------------------------------------------------------------------

/// A polygon with one texture coordinate per corner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Material slot index on the owning surface.
    pub slot: usize,
    /// Per-corner texture coordinates.
    pub uvs: Vec<Vec2>,
}

/// A mesh object with ordered material slots and face-corner coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshSurface {
    /// Object name.
    pub name: String,
    /// Slot → material. Order is significant.
    pub slots: Vec<MaterialId>,
    /// Faces referencing the slots.
    #[serde(default)]
    pub faces: Vec<Face>,
    /// Excluded from rendering.
    #[serde(default)]
    pub hide_render: bool,
}

impl MeshSurface {
    /// A surface without faces.
    pub fn new(name: impl Into<String>, slots: Vec<MaterialId>) -> Self {
        Self {
            name: name.into(),
            slots,
            faces: Vec::new(),
            hide_render: false,
        }
    }

    /// Builder: adds a face on `slot`.
    pub fn with_face(mut self, slot: usize, uvs: Vec<Vec2>) -> Self {
        self.faces.push(Face { slot, uvs });
        self
    }

    /// Distinct materials in slot order.
    pub fn materials(&self) -> Vec<MaterialId> {
        let mut seen = Vec::with_capacity(self.slots.len());
        for id in &self.slots {
            if !seen.contains(id) {
                seen.push(*id);
            }
        }
        seen
    }
}

// ---------------------------------------------------------------------------
// Capture rig and render settings
// ---------------------------------------------------------------------------

/// The fixed quad that exactly fills the renderer's frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureQuad {
    /// Material currently bound to the quad.
    pub material: Option<MaterialId>,
}

/// Scene-wide render toggles flipped for the duration of a bake.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Render the background as transparent.
    pub film_transparent: bool,
    /// Pixel filter width.
    pub filter_size: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            film_transparent: false,
            filter_size: 1.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Everything the bake passes and the compositor read and mutate.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scene {
    /// Material arena, indexed by [`MaterialId`].
    #[serde(default)]
    pub materials: Vec<Material>,
    /// Surfaces, indexed by [`SurfaceId`].
    #[serde(default)]
    pub surfaces: Vec<MeshSurface>,
    /// Shared node groups by name.
    #[serde(default)]
    pub node_groups: BTreeMap<String, ShaderGraph>,
    /// In-memory image assets.
    #[serde(skip)]
    pub images: ImageStore,
    /// Capture rig quad.
    #[serde(default)]
    pub capture_quad: CaptureQuad,
    /// Render toggles.
    #[serde(default)]
    pub render_settings: RenderSettings,
}

impl Scene {
    /// An empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a material and returns its id.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId((self.materials.len() - 1) as u32)
    }

    /// Appends a surface and returns its id.
    pub fn add_surface(&mut self, surface: MeshSurface) -> SurfaceId {
        self.surfaces.push(surface);
        SurfaceId((self.surfaces.len() - 1) as u32)
    }

    /// Registers a shared node group.
    pub fn add_node_group(&mut self, name: impl Into<String>, graph: ShaderGraph) {
        self.node_groups.insert(name.into(), graph);
    }

    /// Material by id.
    pub fn material(&self, id: MaterialId) -> Result<&Material, SceneError> {
        self.materials
            .get(id.0 as usize)
            .ok_or(SceneError::UnknownMaterial(id))
    }

    /// Mutable material by id.
    pub fn material_mut(&mut self, id: MaterialId) -> Result<&mut Material, SceneError> {
        self.materials
            .get_mut(id.0 as usize)
            .ok_or(SceneError::UnknownMaterial(id))
    }

    /// First material with this exact name.
    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|m| m.name == name)
            .map(|idx| MaterialId(idx as u32))
    }

    /// Material ids in arena order.
    pub fn material_ids(&self) -> impl Iterator<Item = MaterialId> + use<> {
        (0..self.materials.len() as u32).map(MaterialId)
    }

    /// Surface by id.
    pub fn surface(&self, id: SurfaceId) -> Result<&MeshSurface, SceneError> {
        self.surfaces
            .get(id.0 as usize)
            .ok_or(SceneError::UnknownSurface(id))
    }

    /// Mutable surface by id.
    pub fn surface_mut(&mut self, id: SurfaceId) -> Result<&mut MeshSurface, SceneError> {
        self.surfaces
            .get_mut(id.0 as usize)
            .ok_or(SceneError::UnknownSurface(id))
    }

    /// First surface with this exact name.
    pub fn surface_id(&self, name: &str) -> Option<SurfaceId> {
        self.surfaces
            .iter()
            .position(|s| s.name == name)
            .map(|idx| SurfaceId(idx as u32))
    }

    /// Surface ids in declaration order.
    pub fn surface_ids(&self) -> impl Iterator<Item = SurfaceId> + use<> {
        (0..self.surfaces.len() as u32).map(SurfaceId)
    }

    /// Shared node group by name.
    pub fn node_group(&self, name: &str) -> Option<&ShaderGraph> {
        self.node_groups.get(name)
    }

    /// Mutable shared node group by name.
    pub fn node_group_mut(&mut self, name: &str) -> Result<&mut ShaderGraph, SceneError> {
        self.node_groups
            .get_mut(name)
            .ok_or_else(|| SceneError::NodeGroupNotFound(name.to_string()))
    }

    /// Repoints every slot on every surface from `from` to `to`. Returns the
    /// number of slots changed.
    pub fn replace_material_everywhere(&mut self, from: MaterialId, to: MaterialId) -> usize {
        let mut changed = 0;
        for surface in &mut self.surfaces {
            for binding in &mut surface.slots {
                if *binding == from {
                    *binding = to;
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Surfaces with at least one slot bound to `material`, in declaration order.
    pub fn surfaces_using(&self, material: MaterialId) -> Vec<SurfaceId> {
        self.surface_ids()
            .filter(|id| self.surfaces[id.0 as usize].slots.contains(&material))
            .collect()
    }

    /// Image bindings of `material`: its own image nodes followed by the image
    /// nodes inside the tree referenced by its `texture_group` node.
    pub fn bound_images(
        &self,
        material: MaterialId,
        texture_group: &str,
    ) -> Result<Vec<String>, SceneError> {
        let graph = &self.material(material)?.graph;
        let mut images: Vec<String> = graph
            .image_nodes()
            .filter_map(|(_, image)| image.map(str::to_string))
            .collect();

        if let Some(tree) = graph.group_tree(texture_group) {
            match self.node_group(tree) {
                Some(group) => images.extend(
                    group
                        .image_nodes()
                        .filter_map(|(_, image)| image.map(str::to_string)),
                ),
                None => debug!("Texture tree {tree} missing, treating as empty"),
            }
        }
        Ok(images)
    }
}
