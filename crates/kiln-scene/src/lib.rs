//! Scene model shared by the bake passes and the atlas compositor.
//!
//! Holds materials with their shader graphs, mesh surfaces with per-face-corner
//! texture coordinates, and the in-memory image store. Every operation takes
//! its target explicitly; there is no hidden "active object" state.

mod graph;
mod raster;
mod scene;
mod uv;

pub use graph::{GraphEdit, GraphError, Link, Node, NodeKind, ShaderGraph, Socket, SocketValue};
pub use raster::{ImageAsset, ImageError, ImageStore, OutputDir, PixelBuffer};
pub use scene::{
    BlendMode, CaptureQuad, Face, Material, MaterialId, MeshSurface, RenderSettings, Scene,
    SceneError, SurfaceId,
};
pub use uv::{UvBounds, UvOp};
