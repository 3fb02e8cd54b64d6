//! One bake pass over one surface.
//!
//! Each material is baked as a transaction: edit its graph for the pass,
//! isolate it on the surface and the capture quad, render, then put every
//! edit and slot binding back before anything else happens, including error
//! propagation.

use kiln_config::NamingConfig;
use kiln_scene::{
    GraphEdit, ImageAsset, Link, MaterialId, PixelBuffer, Scene, SceneError, SocketValue,
    SurfaceId,
};
use tracing::{debug, info};

use crate::baked::BakedImages;
use crate::error::BakeError;
use crate::job::{BakeDecision, BakeJob, BakeKey};
use crate::manifest::{BakeManifest, fingerprint};
use crate::pass::PassType;
use crate::renderer::{OutputFormat, RenderRequest, Renderer};
use crate::settings::BakeSettings;

const MARKER_THRESHOLD: f32 = 0.5;

/// Files produced or reused by one pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassOutcome {
    /// Pass that ran.
    pub pass: PassType,
    /// Freshly rendered.
    pub written: Vec<BakeKey>,
    /// Existing files loaded back from disk.
    pub reused: Vec<BakeKey>,
}

impl PassOutcome {
    fn new(pass: PassType) -> Self {
        Self {
            pass,
            written: Vec::new(),
            reused: Vec::new(),
        }
    }

    /// Index of every image this pass left in the store.
    pub fn baked_images(&self) -> BakedImages {
        self.written
            .iter()
            .chain(&self.reused)
            .map(|key| (key.clone(), key.file_name()))
            .collect()
    }
}

/// Bakes every non-outline material on `surface` for `pass`.
///
/// Written and reused images are both loaded into `scene.images` under their
/// file names. A renderer failure aborts the pass once the failing material's
/// edits are undone; files written before it stay on disk and in `manifest`.
pub fn run_pass<R: Renderer + ?Sized>(
    scene: &mut Scene,
    renderer: &mut R,
    surface: SurfaceId,
    pass: PassType,
    settings: &BakeSettings,
    manifest: &mut BakeManifest,
) -> Result<PassOutcome, BakeError> {
    let naming = &settings.naming;
    let neutral = scene
        .material_id(&naming.neutral_material)
        .ok_or_else(|| BakeError::MissingNeutralMaterial(naming.neutral_material.clone()))?;
    let materials = scene.surface(surface)?.materials();
    let mut outcome = PassOutcome::new(pass);

    for material in materials {
        let name = scene.material(material)?.name.clone();
        if naming.is_outline(&name) {
            debug!("Skipping outline material {name}");
            continue;
        }

        let job = plan_job(scene, material, pass, settings, manifest)?;
        if job.decision == BakeDecision::Skip {
            debug!("Reusing {}", job.file_name);
            let path = settings.output.file_path(&job.file_name);
            scene.images.load_png(&job.file_name, &path)?;
            outcome.reused.push(job.key);
            continue;
        }

        reset_marker(scene, material, naming)?;
        let buffer = bake_material(scene, renderer, surface, &job, neutral, settings)?;
        scene
            .images
            .insert(ImageAsset::new(job.file_name.clone(), buffer));
        manifest.record(job.file_name.clone(), job.fingerprint);
        manifest.save(&settings.output)?;

        let (width, height) = job.resolution;
        info!(
            "Baked {} ({}x{}{})",
            job.file_name,
            width,
            height,
            if job.decision == BakeDecision::Fallback {
                ", fallback"
            } else {
                ""
            }
        );
        outcome.written.push(job.key);
    }

    Ok(outcome)
}

/// Render target for `material`: the largest bound image (by area) scaled by
/// the multiplier, with name-based overrides. `None` when no image is bound.
pub fn select_resolution(
    scene: &Scene,
    material: MaterialId,
    settings: &BakeSettings,
) -> Result<Option<(u32, u32)>, SceneError> {
    let target = scene.material(material)?;
    let mut largest: Option<(u32, u32)> = None;
    for image in scene.bound_images(material, &settings.naming.texture_group_node)? {
        let Some(asset) = scene.images.get(&image) else {
            debug!("Image {image} bound on {} is not loaded", target.name);
            continue;
        };
        let size = asset.dimensions();
        if largest.is_none_or(|(w, h)| area(size) > area((w, h))) {
            largest = Some(size);
        }
    }

    let Some(size) = largest else {
        return Ok(None);
    };
    let base = match settings.fixed_resolution(&target.name) {
        Some(edge) => (edge, edge),
        None => size,
    };
    let multiplier = settings.resolution_multiplier;
    Ok(Some((scale(base.0, multiplier), scale(base.1, multiplier))))
}

fn area((w, h): (u32, u32)) -> u64 {
    u64::from(w) * u64::from(h)
}

fn scale(edge: u32, multiplier: f32) -> u32 {
    ((edge as f32) * multiplier).round().max(1.0) as u32
}

fn plan_job(
    scene: &Scene,
    material: MaterialId,
    pass: PassType,
    settings: &BakeSettings,
    manifest: &BakeManifest,
) -> Result<BakeJob, BakeError> {
    let naming = &settings.naming;
    let graph = &scene.material(material)?.graph;
    let key = BakeKey::new(scene.material(material)?.name.clone(), pass);
    let file_name = key.file_name();

    let (resolution, render) = match select_resolution(scene, material, settings)? {
        Some(resolution) => (resolution, BakeDecision::Bake),
        None => {
            let edge = settings.fallback_resolution;
            debug!("No bound image on {}, using {edge}x{edge}", key.material);
            ((edge, edge), BakeDecision::Fallback)
        }
    };
    let fingerprint = fingerprint(scene, material, pass, resolution, naming)?;

    // Marker present: reuse only once the material was switched to its baked
    // image. Marker absent: an interrupted run already wrote this file.
    let marker_allows_reuse = if graph.has_node(&naming.marker_node) {
        graph
            .input_value(&naming.marker_node, &naming.marker_input)
            .is_some_and(|value| value.as_f32() > MARKER_THRESHOLD)
    } else {
        true
    };
    let exists = settings.output.exists(&file_name);
    let fresh = !settings.verify_fingerprints || manifest.accepts(&file_name, fingerprint);
    if exists && !fresh {
        info!("{file_name} is stale, baking again");
    }

    let decision = if exists && fresh && marker_allows_reuse {
        BakeDecision::Skip
    } else {
        render
    };

    Ok(BakeJob {
        material,
        key,
        file_name,
        resolution,
        fingerprint,
        decision,
    })
}

/// Forces the procedural graph by zeroing the marker weight. Not restored.
fn reset_marker(
    scene: &mut Scene,
    material: MaterialId,
    naming: &NamingConfig,
) -> Result<(), BakeError> {
    let target = scene.material_mut(material)?;
    if target
        .graph
        .input_value(&naming.marker_node, &naming.marker_input)
        .is_none()
    {
        return Ok(());
    }
    target
        .graph
        .set_input_value(&naming.marker_node, &naming.marker_input, SocketValue::Float(0.0))
        .map_err(|source| BakeError::Graph {
            owner: target.name.clone(),
            source,
        })?;
    Ok(())
}

fn bake_material<R: Renderer + ?Sized>(
    scene: &mut Scene,
    renderer: &mut R,
    surface: SurfaceId,
    job: &BakeJob,
    neutral: MaterialId,
    settings: &BakeSettings,
) -> Result<PixelBuffer, BakeError> {
    let original_slots = scene.surface(surface)?.slots.clone();
    let edits = apply_pass_edits(scene, job.material, job.key.pass, &settings.naming)?;

    let rendered = render_isolated(scene, renderer, surface, job, neutral, settings);

    let reverted = scene.material_mut(job.material)?.graph.revert_all(edits);
    scene.surface_mut(surface)?.slots = original_slots;

    let buffer = rendered?;
    reverted.map_err(|source| BakeError::Graph {
        owner: job.key.material.clone(),
        source,
    })?;
    Ok(buffer)
}

fn render_isolated<R: Renderer + ?Sized>(
    scene: &mut Scene,
    renderer: &mut R,
    surface: SurfaceId,
    job: &BakeJob,
    neutral: MaterialId,
    settings: &BakeSettings,
) -> Result<PixelBuffer, BakeError> {
    for binding in scene.surface_mut(surface)?.slots.iter_mut() {
        if *binding != job.material {
            *binding = neutral;
        }
    }
    let previous_capture = scene.capture_quad.material.replace(job.material);

    let (width, height) = job.resolution;
    let request = RenderRequest {
        width,
        height,
        output_path: settings.output.file_path(&job.file_name),
        format: OutputFormat::Png8Rgba,
    };
    let rendered = renderer.render(scene, &request);
    scene.capture_quad.material = previous_capture;

    rendered.map_err(|source| BakeError::Render {
        material: job.key.material.clone(),
        source,
    })
}

fn apply_pass_edits(
    scene: &mut Scene,
    material: MaterialId,
    pass: PassType,
    naming: &NamingConfig,
) -> Result<Vec<GraphEdit>, BakeError> {
    let target = scene.material_mut(material)?;
    let graph = &mut target.graph;
    let Some(raw_shade) = graph.node(&naming.raw_shade_node) else {
        return Ok(Vec::new());
    };

    let edit = match pass {
        PassType::Normal => {
            let output_present = graph
                .node(&naming.output_node)
                .is_some_and(|node| node.input(&naming.output_input).is_some());
            if !raw_shade.has_output(&naming.raw_shade_normal_output) || !output_present {
                debug!("{} has no normal passthrough, baking as-is", target.name);
                return Ok(Vec::new());
            }
            graph.add_link(Link::new(
                naming.raw_shade_node.as_str(),
                naming.raw_shade_normal_output.as_str(),
                naming.output_node.as_str(),
                naming.output_input.as_str(),
            ))
        }
        PassType::Lit | PassType::Unlit => {
            if raw_shade.input(&naming.raw_shade_toggle_input).is_none() {
                return Ok(Vec::new());
            }
            graph.set_input_value(
                &naming.raw_shade_node,
                &naming.raw_shade_toggle_input,
                SocketValue::Float(1.0),
            )
        }
    };

    edit.map(|edit| vec![edit])
        .map_err(|source| BakeError::Graph {
            owner: target.name.clone(),
            source,
        })
}
