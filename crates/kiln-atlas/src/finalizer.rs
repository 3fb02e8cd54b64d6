//! Material finalizer: swaps every baked procedural material for a copy of a
//! minimal template that only samples the baked images.

use kiln_bake::{BakedImages, PassType};
use kiln_config::{AtlasConfig, NamingConfig};
use kiln_scene::{BlendMode, Link, Material, MaterialId, Node, Scene, ShaderGraph, SocketValue};
use tracing::{debug, info, warn};

use crate::error::FinalizeError;

/// Candidates for the main image, in preference order.
const MAIN_PASSES: [PassType; 2] = [PassType::Lit, PassType::Unlit];

// ---------------------------------------------------------------------------
// Template provider
// ---------------------------------------------------------------------------

/// Recreates the template material when the scene lacks it.
pub trait TemplateProvider {
    /// Adds the template material (and its texture tree) to `scene`.
    fn provide(
        &mut self,
        scene: &mut Scene,
        naming: &NamingConfig,
    ) -> Result<MaterialId, FinalizeError>;
}

/// Builds the minimal template in code: a texture group with the three image
/// slots feeding a shader node wired to the material output.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinTemplate;

impl BuiltinTemplate {
    /// Name of the texture tree created alongside the template.
    pub fn tree_name(naming: &NamingConfig) -> String {
        format!("{} Textures", naming.template_material)
    }
}

impl TemplateProvider for BuiltinTemplate {
    fn provide(
        &mut self,
        scene: &mut Scene,
        naming: &NamingConfig,
    ) -> Result<MaterialId, FinalizeError> {
        warn!(
            "Template material {} missing, recreating it",
            naming.template_material
        );
        let tree_name = Self::tree_name(naming);
        let tree = ShaderGraph::new()
            .with_node(Node::image(naming.template_main_slot.as_str(), None))
            .with_node(Node::image(naming.template_dark_slot.as_str(), None))
            .with_node(Node::image(naming.template_normal_slot.as_str(), None));
        scene.add_node_group(tree_name.as_str(), tree);

        let graph = ShaderGraph::new()
            .with_node(
                Node::group(naming.texture_group_node.as_str(), tree_name).with_output("Color"),
            )
            .with_node(
                Node::generic(naming.shader_node.as_str())
                    .with_input("Color", SocketValue::Color([1.0; 4]))
                    .with_output("Shader"),
            )
            .with_node(
                Node::generic(naming.output_node.as_str())
                    .with_input(naming.output_input.as_str(), SocketValue::Float(0.0)),
            )
            .with_link(Link::new(
                naming.texture_group_node.as_str(),
                "Color",
                naming.shader_node.as_str(),
                "Color",
            ))
            .with_link(Link::new(
                naming.shader_node.as_str(),
                "Shader",
                naming.output_node.as_str(),
                naming.output_input.as_str(),
            ));
        Ok(scene.add_material(Material::new(naming.template_material.as_str(), graph)))
    }
}

// ---------------------------------------------------------------------------
// FinalizeReport
// ---------------------------------------------------------------------------

/// What [`finalize_materials`] did to each candidate material.
#[derive(Debug, Default)]
pub struct FinalizeReport {
    /// `(material, renamed original)` per replaced material.
    pub finalized: Vec<(String, String)>,
    /// Candidates left alone because nothing was baked for them.
    pub skipped: Vec<String>,
    /// Candidates that could not be finalized; they keep their procedural
    /// material.
    pub failed: Vec<(String, FinalizeError)>,
}

impl FinalizeReport {
    /// Returns `true` if no candidate failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// finalize_materials
// ---------------------------------------------------------------------------

/// Replaces every baked material with a copy of the template bound to its
/// baked images.
///
/// The main image is the lit bake, or the unlit one when lit was not baked.
/// The dark slot gets the unlit bake only when lit is the main image; the
/// normal slot gets the normal bake. Optional slots stay empty when their
/// image is absent. The original is renamed with the configured suffix and
/// kept alive, and every slot referencing it is repointed at the replacement.
/// A material whose template cannot be resolved is left untouched and
/// reported.
pub fn finalize_materials(
    scene: &mut Scene,
    baked: &BakedImages,
    config: &AtlasConfig,
    naming: &NamingConfig,
    provider: &mut dyn TemplateProvider,
) -> FinalizeReport {
    let mut report = FinalizeReport::default();
    let mut template: Option<Result<MaterialId, String>> = None;

    let candidates: Vec<MaterialId> = scene
        .material_ids()
        .filter(|&id| {
            scene
                .material(id)
                .is_ok_and(|material| is_candidate(scene, &material.name, naming))
        })
        .collect();

    for id in candidates {
        let Ok(name) = scene.material(id).map(|material| material.name.clone()) else {
            continue;
        };
        let Some((main_pass, main)) = baked.first_of(&name, &MAIN_PASSES) else {
            debug!("Nothing baked for {name}, keeping its material");
            report.skipped.push(name);
            continue;
        };

        let template_id = match template
            .get_or_insert_with(|| resolve_template(scene, naming, provider))
        {
            Ok(template_id) => *template_id,
            Err(reason) => {
                report.failed.push((
                    name,
                    FinalizeError::TemplateUnavailable {
                        template: naming.template_material.clone(),
                        reason: reason.clone(),
                    },
                ));
                continue;
            }
        };

        let result = build_replacement(scene, baked, naming, template_id, &name, main_pass, main)
            .and_then(|(graph, tree)| commit(scene, config, naming, id, &name, graph, tree));
        match result {
            Ok(original) => {
                info!("Finalized {name} with {main}");
                report.finalized.push((name, original));
            }
            Err(err) => {
                warn!("Could not finalize {name}: {err}");
                report.failed.push((name, err));
            }
        }
    }

    info!(
        "Finalized {} material(s), {} skipped, {} failed",
        report.finalized.len(),
        report.skipped.len(),
        report.failed.len()
    );
    report
}

fn is_candidate(scene: &Scene, name: &str, naming: &NamingConfig) -> bool {
    name.contains(&naming.bake_prefix)
        && !naming.is_outline(name)
        && name != naming.template_material
        && !name.ends_with(&naming.original_suffix)
        // Already finalized by an earlier run.
        && scene
            .material_id(&format!("{name}{}", naming.original_suffix))
            .is_none()
}

fn resolve_template(
    scene: &mut Scene,
    naming: &NamingConfig,
    provider: &mut dyn TemplateProvider,
) -> Result<MaterialId, String> {
    if let Some(id) = scene.material_id(&naming.template_material) {
        return Ok(id);
    }
    provider.provide(scene, naming).map_err(|err| err.to_string())
}

/// Clones the template graph and its texture tree and binds the baked
/// images into the tree. Nothing in `scene` changes.
fn build_replacement(
    scene: &Scene,
    baked: &BakedImages,
    naming: &NamingConfig,
    template: MaterialId,
    name: &str,
    main_pass: PassType,
    main: &str,
) -> Result<(ShaderGraph, ShaderGraph), FinalizeError> {
    if !scene.images.contains(main) {
        return Err(FinalizeError::MissingImage(main.to_string()));
    }
    let graph_error = |source| FinalizeError::Graph {
        material: name.to_string(),
        source,
    };

    let mut graph = scene.material(template)?.graph.clone();
    let mut tree = graph
        .group_tree(&naming.texture_group_node)
        .and_then(|tree| scene.node_group(tree))
        .cloned()
        .ok_or_else(|| FinalizeError::TemplateTexturesMissing(naming.template_material.clone()))?;

    tree.set_image(&naming.template_main_slot, Some(main.to_string()))
        .map_err(graph_error)?;

    let loaded = |pass| {
        baked
            .get(name, pass)
            .filter(|image| scene.images.contains(image))
    };
    if main_pass == PassType::Lit {
        if let Some(dark) = loaded(PassType::Unlit) {
            tree.set_image(&naming.template_dark_slot, Some(dark.to_string()))
                .map_err(graph_error)?;
        }
    }
    if let Some(normal) = loaded(PassType::Normal) {
        tree.set_image(&naming.template_normal_slot, Some(normal.to_string()))
            .map_err(graph_error)?;
    }

    graph
        .set_group_tree(&naming.texture_group_node, name)
        .map_err(graph_error)?;
    Ok((graph, tree))
}

/// Renames the original, adds the replacement and repoints every slot.
/// Returns the original's new name.
fn commit(
    scene: &mut Scene,
    config: &AtlasConfig,
    naming: &NamingConfig,
    original: MaterialId,
    name: &str,
    graph: ShaderGraph,
    tree: ShaderGraph,
) -> Result<String, FinalizeError> {
    let renamed = format!("{name}{}", naming.original_suffix);
    let previous = scene.material_mut(original)?;
    previous.name = renamed.clone();
    previous.keep_alive = true;

    scene.add_node_group(name, tree);
    let mut replacement = Material::new(name, graph);
    replacement.blend_mode = if config.alpha_blend_materials.iter().any(|m| m == name) {
        BlendMode::AlphaBlend
    } else {
        BlendMode::Clip
    };
    let replacement = scene.add_material(replacement);
    let slots = scene.replace_material_everywhere(original, replacement);
    debug!("{name}: {slots} slot(s) repointed, original kept as {renamed}");
    Ok(renamed)
}
