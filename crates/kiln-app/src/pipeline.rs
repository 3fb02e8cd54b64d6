//! End-to-end bake: rim normalization, every pass on every surface, UV
//! offsets, atlas, finalization.

use std::path::PathBuf;

use kiln_atlas::{
    AtlasOutput, BuiltinTemplate, FinalizeReport, apply_uv_offsets, build_atlas,
    finalize_materials,
};
use kiln_bake::{BakeManifest, BakeSettings, BakeSummary, Renderer, normalize_rim_groups, run_all};
use kiln_config::Config;
use kiln_scene::{RenderSettings, Scene};
use tracing::{info, warn};

use crate::error::PipelineError;

/// Filter width used while baking.
const BAKE_FILTER_SIZE: f32 = 0.5;

/// Outcome of [`run_pipeline`].
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Every bake pass that ran, across all surfaces.
    pub bake: BakeSummary,
    /// Atlas layout and per-pass atlas images.
    pub atlas: AtlasOutput,
    /// Atlas files written to the output directory.
    pub written_atlases: Vec<PathBuf>,
    /// Material replacement results.
    pub finalize: FinalizeReport,
}

impl PipelineReport {
    /// One-line summary for the console.
    pub fn summary(&self) -> String {
        format!(
            "{} image(s) baked, {} reused, atlas {}x{} ({} pass(es)), {} material(s) finalized, {} failed",
            self.bake.written(),
            self.bake.reused(),
            self.atlas.layout.width,
            self.atlas.layout.height,
            self.atlas.atlases.len(),
            self.finalize.finalized.len(),
            self.finalize.failed.len()
        )
    }
}

/// Runs the whole bake over `scene`.
///
/// The scene is switched to transparent film and a narrow pixel filter for
/// the duration; both are put back before returning, whether or not a step
/// failed. The first failing step aborts the rest. Files already written stay
/// on disk, so running again resumes where this run stopped.
pub fn run_pipeline(
    scene: &mut Scene,
    config: &Config,
    renderer: &mut dyn Renderer,
) -> Result<PipelineReport, PipelineError> {
    config.validate()?;
    let previous = std::mem::replace(
        &mut scene.render_settings,
        RenderSettings {
            film_transparent: true,
            filter_size: BAKE_FILTER_SIZE,
        },
    );

    let result = run_steps(scene, config, renderer);

    scene.render_settings = previous;
    match &result {
        Ok(report) => info!("Pipeline finished: {}", report.summary()),
        Err(err) => warn!("Pipeline aborted: {err}"),
    }
    result
}

fn run_steps(
    scene: &mut Scene,
    config: &Config,
    renderer: &mut dyn Renderer,
) -> Result<PipelineReport, PipelineError> {
    let settings = BakeSettings::from_config(config);
    settings.output.ensure()?;
    let mut manifest = BakeManifest::load(&settings.output)?;

    normalize_rim_groups(scene, &settings.naming)?;

    let mut report = PipelineReport::default();
    for surface in scene.surface_ids() {
        let summary = run_all(scene, renderer, surface, &settings, &mut manifest)?;
        report.bake.merge(summary);
    }
    let baked = report.bake.baked_images();

    let moved = apply_uv_offsets(scene, &config.atlas.uv_offsets)?;
    if moved > 0 {
        info!("Applied UV offsets to {moved} corner(s)");
    }

    report.atlas = build_atlas(scene, &baked, &config.atlas)?;
    if config.atlas.write_atlas {
        for (_, name) in &report.atlas.atlases {
            let path = settings.output.file_path(name);
            scene.images.save_png(name, &path)?;
            info!("Wrote {}", path.display());
            report.written_atlases.push(path);
        }
    }

    let bindings = report.atlas.bindings(&baked);
    report.finalize = finalize_materials(
        scene,
        &bindings,
        &config.atlas,
        &settings.naming,
        &mut BuiltinTemplate,
    );
    if !report.finalize.is_clean() {
        warn!(
            "{} material(s) could not be finalized",
            report.finalize.failed.len()
        );
        for (material, err) in &report.finalize.failed {
            warn!("{material} kept its procedural material: {err}");
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use kiln_bake::{FlatRenderer, PassType, RenderError, RenderRequest};
    use kiln_scene::{ImageAsset, Material, MeshSurface, Node, PixelBuffer, ShaderGraph};

    fn unit_quad() -> Vec<Vec2> {
        vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y]
    }

    fn textured(name: &str, image: &str) -> Material {
        Material::new(
            name,
            ShaderGraph::new().with_node(Node::image("Base", Some(image))),
        )
    }

    fn character_scene() -> Scene {
        let mut scene = Scene::new();
        scene.images.insert(ImageAsset::new(
            "body.png",
            PixelBuffer::from_pixel(64, 64, [200, 100, 50, 255]),
        ));
        let body = scene.add_material(textured("KK Body", "body.png"));
        // Nothing bound: baked at the fallback size.
        let face = scene.add_material(Material::new("KK Face", ShaderGraph::new()));
        scene.add_material(Material::new("KK Eyeline down", ShaderGraph::new()));
        scene.add_surface(
            MeshSurface::new("Body", vec![body, face])
                .with_face(0, unit_quad())
                .with_face(1, unit_quad()),
        );
        scene
    }

    fn config(output: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.bake.output_dir = output.to_path_buf();
        config.bake.passes.unlit = false;
        config.atlas.write_atlas = true;
        config
    }

    #[test]
    fn test_textured_and_untextured_materials_two_passes() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut scene = character_scene();
        let mut renderer = FlatRenderer::new(config.naming.clone());

        let report = run_pipeline(&mut scene, &config, &mut renderer).unwrap();

        assert_eq!(renderer.renders(), 4);
        assert_eq!(report.bake.written(), 4);
        for file in [
            "KK Body light.png",
            "KK Body normal.png",
            "KK Face light.png",
            "KK Face normal.png",
        ] {
            assert!(dir.path().join(file).is_file(), "{file} missing");
        }

        assert_eq!(report.atlas.layout.width, 128);
        assert_eq!(report.atlas.layout.height, 64);
        assert_eq!(report.atlas.atlas(PassType::Unlit), None);
        assert_eq!(report.written_atlases.len(), 2);
        let atlas = PixelBuffer::load(&dir.path().join("Atlas light.png")).unwrap();
        assert_eq!(atlas.dimensions(), (128, 64));

        assert_eq!(report.finalize.finalized.len(), 2);
        assert!(report.finalize.is_clean());
        let body = scene.material_id("KK Body").unwrap();
        let tree = scene
            .material(body)
            .unwrap()
            .graph
            .group_tree("Gentex")
            .and_then(|tree| scene.node_group(tree))
            .unwrap();
        assert_eq!(tree.image("MapMain"), Some("Atlas light.png"));
        assert_eq!(tree.image("MapNorm"), Some("Atlas normal.png"));

        // Render toggles are back to their defaults.
        assert_eq!(scene.render_settings, RenderSettings::default());
    }

    #[test]
    fn test_rerun_reuses_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        run_pipeline(
            &mut character_scene(),
            &config,
            &mut FlatRenderer::new(config.naming.clone()),
        )
        .unwrap();

        let mut renderer = FlatRenderer::new(config.naming.clone());
        let report = run_pipeline(&mut character_scene(), &config, &mut renderer).unwrap();
        assert_eq!(renderer.renders(), 0);
        assert_eq!(report.bake.reused(), 4);
        assert_eq!(report.atlas.layout.width, 128);
    }

    struct BrokenRenderer;

    impl Renderer for BrokenRenderer {
        fn render(
            &mut self,
            _scene: &Scene,
            _request: &RenderRequest,
        ) -> Result<PixelBuffer, RenderError> {
            Err(RenderError::Backend("device lost".to_string()))
        }
    }

    #[test]
    fn test_failure_restores_render_settings() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut scene = character_scene();
        let before = scene.materials.clone();

        let err = run_pipeline(&mut scene, &config, &mut BrokenRenderer).unwrap_err();
        assert!(matches!(err, PipelineError::Bake(_)));
        assert!(err.to_string().contains("device lost"));
        assert_eq!(scene.render_settings, RenderSettings::default());
        assert_eq!(scene.materials, before);
    }
}
