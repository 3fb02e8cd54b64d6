//! Runs the enabled passes for one surface in the fixed order lit, unlit,
//! normal.

use kiln_config::NamingConfig;
use kiln_scene::{GraphEdit, Scene, SocketValue, SurfaceId};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::baked::BakedImages;
use crate::error::BakeError;
use crate::job::BakeKey;
use crate::manifest::BakeManifest;
use crate::orchestrator::{PassOutcome, run_pass};
use crate::pass::PassType;
use crate::renderer::Renderer;
use crate::settings::BakeSettings;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Outcomes of every pass that ran, in execution order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BakeSummary {
    /// One entry per completed pass.
    pub outcomes: Vec<PassOutcome>,
}

impl BakeSummary {
    /// Index of every baked image across all passes.
    pub fn baked_images(&self) -> BakedImages {
        let mut baked = BakedImages::new();
        for outcome in &self.outcomes {
            baked.extend(outcome.baked_images());
        }
        baked
    }

    /// Number of distinct files rendered. A material shared by several
    /// surfaces counts once even when each surface baked it again.
    pub fn written(&self) -> usize {
        self.written_keys().len()
    }

    /// Number of distinct files reused and never rendered in this run.
    pub fn reused(&self) -> usize {
        let written = self.written_keys();
        self.outcomes
            .iter()
            .flat_map(|o| &o.reused)
            .filter(|key| !written.contains(key))
            .collect::<FxHashSet<_>>()
            .len()
    }

    fn written_keys(&self) -> FxHashSet<&BakeKey> {
        self.outcomes.iter().flat_map(|o| &o.written).collect()
    }

    /// Appends the outcomes of another summary.
    pub fn merge(&mut self, other: BakeSummary) {
        self.outcomes.extend(other.outcomes);
    }
}

/// Bakes `surface` once per enabled pass.
///
/// Other surfaces are hidden from render for the duration. Before a lit or
/// unlit pass the shared lighting network is forced to a constant white or
/// black; its link and value are restored once the shaded passes are done,
/// and always before an error is returned. Passes never overlap.
pub fn run_all<R: Renderer + ?Sized>(
    scene: &mut Scene,
    renderer: &mut R,
    surface: SurfaceId,
    settings: &BakeSettings,
    manifest: &mut BakeManifest,
) -> Result<BakeSummary, BakeError> {
    let surface_name = scene.surface(surface)?.name.clone();
    let passes = PassType::enabled(&settings.passes);
    info!("Baking {surface_name}: {} pass(es)", passes.len());

    let visibility = hide_other_surfaces(scene, surface);
    let result = run_passes(scene, renderer, surface, &passes, settings, manifest);
    for (target, hidden) in scene.surfaces.iter_mut().zip(visibility) {
        target.hide_render = hidden;
    }

    let summary = result?;
    info!(
        "Finished {surface_name}: {} written, {} reused",
        summary.written(),
        summary.reused()
    );
    Ok(summary)
}

fn hide_other_surfaces(scene: &mut Scene, surface: SurfaceId) -> Vec<bool> {
    scene
        .surfaces
        .iter_mut()
        .enumerate()
        .map(|(idx, target)| {
            let previous = target.hide_render;
            target.hide_render = idx != surface.0 as usize;
            previous
        })
        .collect()
}

fn run_passes<R: Renderer + ?Sized>(
    scene: &mut Scene,
    renderer: &mut R,
    surface: SurfaceId,
    passes: &[PassType],
    settings: &BakeSettings,
    manifest: &mut BakeManifest,
) -> Result<BakeSummary, BakeError> {
    let naming = &settings.naming;
    let mut lighting = LightingOverride::default();
    let mut summary = BakeSummary::default();
    let mut failure = None;

    for &pass in passes {
        let prepared = if pass.is_shaded() {
            lighting.apply(scene, pass, naming)
        } else {
            lighting.restore(scene, naming)
        };
        match prepared.and_then(|()| run_pass(scene, renderer, surface, pass, settings, manifest)) {
            Ok(outcome) => summary.outcomes.push(outcome),
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    let restored = lighting.restore(scene, naming);
    if let Some(err) = failure {
        return Err(err);
    }
    restored?;
    Ok(summary)
}

// ---------------------------------------------------------------------------
// LightingOverride
// ---------------------------------------------------------------------------

/// Edits made to the shared lighting network, undone as a unit.
#[derive(Debug, Default)]
struct LightingOverride {
    edits: Vec<GraphEdit>,
}

impl LightingOverride {
    fn apply(
        &mut self,
        scene: &mut Scene,
        pass: PassType,
        naming: &NamingConfig,
    ) -> Result<(), BakeError> {
        let Ok(group) = scene.node_group_mut(&naming.lighting_group) else {
            debug!("No {} group, lighting left as-is", naming.lighting_group);
            return Ok(());
        };
        let node = naming.lighting_break_node.as_str();
        let input = naming.lighting_break_input.as_str();
        if group.input_value(node, input).is_none() {
            debug!("{} has no {node}.{input}", naming.lighting_group);
            return Ok(());
        }

        let graph_error = |source| BakeError::Graph {
            owner: naming.lighting_group.clone(),
            source,
        };
        if self.edits.is_empty() {
            self.edits
                .push(group.remove_link_into(node, input).map_err(graph_error)?);
        }
        let color = if pass == PassType::Lit { WHITE } else { BLACK };
        self.edits.push(
            group
                .set_input_value(node, input, SocketValue::Color(color))
                .map_err(graph_error)?,
        );
        Ok(())
    }

    fn restore(&mut self, scene: &mut Scene, naming: &NamingConfig) -> Result<(), BakeError> {
        if self.edits.is_empty() {
            return Ok(());
        }
        let edits = std::mem::take(&mut self.edits);
        scene
            .node_group_mut(&naming.lighting_group)?
            .revert_all(edits)
            .map_err(|source| BakeError::Graph {
                owner: naming.lighting_group.clone(),
                source,
            })
    }
}
