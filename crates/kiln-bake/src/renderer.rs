//! The renderer seam and a flat reference renderer.

use std::path::PathBuf;

use kiln_config::NamingConfig;
use kiln_scene::{MaterialId, PixelBuffer, Scene};
use tracing::trace;

use crate::error::RenderError;

/// Encoding of the rendered file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// 8 bits per channel RGBA PNG with alpha preserved.
    #[default]
    Png8Rgba,
}

/// One synchronous render of the capture quad.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// File the renderer writes before returning.
    pub output_path: PathBuf,
    /// File encoding.
    pub format: OutputFormat,
}

/// Turns the current scene configuration into a raster image.
///
/// Implementations render whatever material is bound to the capture quad,
/// write it to `request.output_path` and block until the file exists. Output
/// must be deterministic for a given scene and request.
pub trait Renderer {
    /// Renders the capture quad and writes the result to disk.
    fn render(
        &mut self,
        scene: &Scene,
        request: &RenderRequest,
    ) -> Result<PixelBuffer, RenderError>;
}

// ---------------------------------------------------------------------------
// FlatRenderer
// ---------------------------------------------------------------------------

const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];
const SOLID_WHITE: [u8; 4] = [255, 255, 255, 255];
const NORMAL_NODE_MARKER: &str = "Norm";

/// Reference renderer that evaluates the capture material without lighting
/// simulation.
///
/// The largest bound color image is resampled to the target size and shaded
/// by the lighting network's constant. When the output is wired to the
/// normal channel, the bound normal map (or a flat normal) is emitted.
#[derive(Clone, Debug)]
pub struct FlatRenderer {
    naming: NamingConfig,
    renders: usize,
}

impl FlatRenderer {
    /// Creates a renderer that resolves nodes by `naming`.
    pub fn new(naming: NamingConfig) -> Self {
        Self { naming, renders: 0 }
    }

    /// Number of completed renders.
    pub fn renders(&self) -> usize {
        self.renders
    }

    fn outputs_normal(&self, scene: &Scene, material: MaterialId) -> Result<bool, RenderError> {
        let graph = &scene.material(material)?.graph;
        Ok(graph
            .link_into(&self.naming.output_node, &self.naming.output_input)
            .is_some_and(|link| {
                link.from_node == self.naming.raw_shade_node
                    && link.from_socket == self.naming.raw_shade_normal_output
            }))
    }

    /// `(node name, image name)` for every bound image node of the material
    /// and its texture group tree.
    fn textures(
        &self,
        scene: &Scene,
        material: MaterialId,
    ) -> Result<Vec<(String, String)>, RenderError> {
        let graph = &scene.material(material)?.graph;
        let mut textures: Vec<(String, String)> = graph
            .image_nodes()
            .filter_map(|(node, image)| Some((node.to_string(), image?.to_string())))
            .collect();
        if let Some(group) = graph
            .group_tree(&self.naming.texture_group_node)
            .and_then(|tree| scene.node_group(tree))
        {
            textures.extend(
                group
                    .image_nodes()
                    .filter_map(|(node, image)| Some((node.to_string(), image?.to_string()))),
            );
        }
        Ok(textures)
    }

    /// Lighting constant in `[0, 1]`; full light while the network is linked.
    fn shading(&self, scene: &Scene) -> f32 {
        let Some(group) = scene.node_group(&self.naming.lighting_group) else {
            return 1.0;
        };
        let node = &self.naming.lighting_break_node;
        let input = &self.naming.lighting_break_input;
        if group.link_into(node, input).is_some() {
            return 1.0;
        }
        group
            .input_value(node, input)
            .map_or(1.0, |value| value.as_f32().clamp(0.0, 1.0))
    }
}

impl Renderer for FlatRenderer {
    fn render(
        &mut self,
        scene: &Scene,
        request: &RenderRequest,
    ) -> Result<PixelBuffer, RenderError> {
        let (width, height) = (request.width, request.height);
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidResolution { width, height });
        }
        let material = scene
            .capture_quad
            .material
            .ok_or(RenderError::NoCaptureMaterial)?;
        let textures = self.textures(scene, material)?;

        let buffer = if self.outputs_normal(scene, material)? {
            textures
                .iter()
                .filter(|(node, _)| node.contains(NORMAL_NODE_MARKER))
                .find_map(|(_, image)| scene.images.get(image))
                .map(|asset| asset.buffer.resized(width, height))
                .unwrap_or_else(|| PixelBuffer::from_pixel(width, height, FLAT_NORMAL))
        } else {
            let base = textures
                .iter()
                .filter(|(node, _)| !node.contains(NORMAL_NODE_MARKER))
                .filter_map(|(_, image)| scene.images.get(image))
                .max_by_key(|asset| asset.buffer.area())
                .map(|asset| asset.buffer.resized(width, height))
                .unwrap_or_else(|| PixelBuffer::from_pixel(width, height, SOLID_WHITE));
            shade(base, 0.5 + 0.5 * self.shading(scene))
        };

        buffer
            .save(&request.output_path)
            .map_err(|source| RenderError::Write {
                path: request.output_path.clone(),
                source,
            })?;
        self.renders += 1;
        trace!(
            "Flat render {}x{} written to {}",
            width,
            height,
            request.output_path.display()
        );
        Ok(buffer)
    }
}

fn shade(buffer: PixelBuffer, factor: f32) -> PixelBuffer {
    let mut image = buffer.into_image();
    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = (f32::from(*channel) * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
    PixelBuffer::from_image(image)
}
