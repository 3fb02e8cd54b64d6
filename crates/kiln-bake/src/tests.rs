use std::path::Path;

use kiln_config::{Config, NamingConfig};
use kiln_scene::{
    ImageAsset, Link, Material, MaterialId, MeshSurface, Node, PixelBuffer, Scene, ShaderGraph,
    SocketValue, SurfaceId,
};

use super::*;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Scene state observed at the moment a render was requested.
#[derive(Clone, Debug)]
struct Observation {
    material: String,
    size: (u32, u32),
    slots: Vec<MaterialId>,
    hidden: Vec<bool>,
    toggle: Option<f32>,
    surface_from: Option<String>,
    lighting: Option<SocketValue>,
    lighting_linked: bool,
}

/// Writes a solid PNG for every request and records what it saw.
#[derive(Default)]
struct RecordingRenderer {
    calls: Vec<Observation>,
    fail_on: Option<String>,
}

impl RecordingRenderer {
    fn failing_on(material: &str) -> Self {
        Self {
            calls: Vec::new(),
            fail_on: Some(material.to_string()),
        }
    }
}

impl Renderer for RecordingRenderer {
    fn render(
        &mut self,
        scene: &Scene,
        request: &RenderRequest,
    ) -> Result<PixelBuffer, RenderError> {
        let id = scene
            .capture_quad
            .material
            .ok_or(RenderError::NoCaptureMaterial)?;
        let material = scene.material(id)?;
        let lighting_group = scene.node_group("Raw Shading");
        self.calls.push(Observation {
            material: material.name.clone(),
            size: (request.width, request.height),
            slots: scene.surfaces[0].slots.clone(),
            hidden: scene.surfaces.iter().map(|s| s.hide_render).collect(),
            toggle: material
                .graph
                .input_value("RawShade", "Disable Normals")
                .map(SocketValue::as_f32),
            surface_from: material
                .graph
                .link_into("Material Output", "Surface")
                .map(|link| format!("{}.{}", link.from_node, link.from_socket)),
            lighting: lighting_group
                .and_then(|g| g.input_value("breaknode", "Shading"))
                .cloned(),
            lighting_linked: lighting_group
                .is_some_and(|g| g.link_into("breaknode", "Shading").is_some()),
        });

        if self.fail_on.as_deref() == Some(material.name.as_str()) {
            return Err(RenderError::Backend("device lost".to_string()));
        }
        let buffer = PixelBuffer::from_pixel(request.width, request.height, [90, 60, 30, 255]);
        buffer
            .save(&request.output_path)
            .map_err(|source| RenderError::Write {
                path: request.output_path.clone(),
                source,
            })?;
        Ok(buffer)
    }
}

struct Fixture {
    scene: Scene,
    body: MaterialId,
    socks: MaterialId,
    neutral: MaterialId,
    surface: SurfaceId,
}

fn procedural_graph(texture_tree: &str) -> ShaderGraph {
    ShaderGraph::new()
        .with_node(
            Node::generic("RawShade")
                .with_input("Disable Normals", SocketValue::Float(0.0))
                .with_output("Shader")
                .with_output("Normal"),
        )
        .with_node(Node::generic("Material Output").with_input("Surface", SocketValue::Float(0.0)))
        .with_node(Node::group("Gentex", texture_tree))
        .with_link(Link::new("RawShade", "Shader", "Material Output", "Surface"))
}

fn fixture() -> Fixture {
    let mut scene = Scene::new();
    scene.images.insert(ImageAsset::new(
        "body_main.png",
        PixelBuffer::from_pixel(512, 512, [255; 4]),
    ));
    scene.images.insert(ImageAsset::new(
        "body_alpha.png",
        PixelBuffer::from_pixel(256, 256, [255; 4]),
    ));
    scene.add_node_group(
        "Body Textures",
        ShaderGraph::new()
            .with_node(Node::image("Maintex", Some("body_main.png")))
            .with_node(Node::image("Alphamask", Some("body_alpha.png"))),
    );
    scene.add_node_group("Empty Textures", ShaderGraph::new());
    scene.add_node_group(
        "Raw Shading",
        ShaderGraph::new()
            .with_node(Node::generic("breakreroute").with_output("Output"))
            .with_node(
                Node::generic("breaknode")
                    .with_input("Shading", SocketValue::Color([0.3, 0.3, 0.3, 1.0])),
            )
            .with_link(Link::new("breakreroute", "Output", "breaknode", "Shading")),
    );

    let body = scene.add_material(Material::new("KK Body", procedural_graph("Body Textures")));
    let socks = scene.add_material(Material::new("KK Socks", procedural_graph("Empty Textures")));
    let outline = scene.add_material(Material::new("KK Body Outline", ShaderGraph::new()));
    let neutral = scene.add_material(Material::new("KK Eyeline down", ShaderGraph::new()));
    let hair = scene.add_material(Material::new("KK Hair", procedural_graph("Empty Textures")));

    let surface = scene.add_surface(MeshSurface::new("Body", vec![body, socks, outline, body]));
    scene.add_surface(MeshSurface::new("Hair", vec![hair]));

    Fixture {
        scene,
        body,
        socks,
        neutral,
        surface,
    }
}

fn settings(dir: &Path) -> BakeSettings {
    let mut config = Config::default();
    config.bake.output_dir = dir.join("baked_files");
    BakeSettings::from_config(&config)
}

fn graph_of(scene: &Scene, id: MaterialId) -> &ShaderGraph {
    &scene.material(id).unwrap().graph
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[test]
fn test_pass_writes_one_file_per_bakeable_material() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    let mut renderer = RecordingRenderer::default();
    let mut manifest = BakeManifest::default();

    let outcome = run_pass(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        PassType::Lit,
        &settings,
        &mut manifest,
    )
    .unwrap();

    let names: Vec<_> = outcome.written.iter().map(BakeKey::file_name).collect();
    assert_eq!(names, vec!["KK Body light.png", "KK Socks light.png"]);
    assert!(outcome.reused.is_empty());
    assert!(settings.output.exists("KK Body light.png"));
    assert!(settings.output.exists("KK Socks light.png"));
    assert!(settings.output.exists(MANIFEST_FILE_NAME));
    assert!(fx.scene.images.contains("KK Body light.png"));
    assert_eq!(manifest.len(), 2);

    // Outline materials never reach the renderer.
    assert!(renderer.calls.iter().all(|c| !c.material.contains("Outline")));
}

#[test]
fn test_second_run_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    let mut renderer = RecordingRenderer::default();
    let mut manifest = BakeManifest::default();

    run_pass(&mut fx.scene, &mut renderer, fx.surface, PassType::Lit, &settings, &mut manifest)
        .unwrap();
    let path = settings.output.file_path("KK Body light.png");
    let before = std::fs::read(&path).unwrap();
    let renders = renderer.calls.len();

    let mut manifest = BakeManifest::load(&settings.output).unwrap();
    let outcome = run_pass(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        PassType::Lit,
        &settings,
        &mut manifest,
    )
    .unwrap();

    assert_eq!(renderer.calls.len(), renders);
    assert!(outcome.written.is_empty());
    assert_eq!(outcome.reused.len(), 2);
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn test_marker_controls_reuse() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    fx.scene.material_mut(fx.body).unwrap().graph.nodes.push(
        Node::generic("KK Mix").with_input("Fac", SocketValue::Float(1.0)),
    );
    let mut renderer = RecordingRenderer::default();
    let mut manifest = BakeManifest::default();

    // First run: no file yet, so the marker is reset and the body is baked.
    run_pass(&mut fx.scene, &mut renderer, fx.surface, PassType::Lit, &settings, &mut manifest)
        .unwrap();
    assert_eq!(
        graph_of(&fx.scene, fx.body).input_value("KK Mix", "Fac"),
        Some(&SocketValue::Float(0.0))
    );
    let first = renderer.calls.len();

    // Marker still zero: the material is in procedural mode and is baked again.
    run_pass(&mut fx.scene, &mut renderer, fx.surface, PassType::Lit, &settings, &mut manifest)
        .unwrap();
    let rebaked: Vec<_> = renderer.calls[first..].iter().map(|c| c.material.as_str()).collect();
    assert_eq!(rebaked, vec!["KK Body"]);

    // Marker set: the finished bake is reused.
    fx.scene
        .material_mut(fx.body)
        .unwrap()
        .graph
        .set_input_value("KK Mix", "Fac", SocketValue::Float(1.0))
        .unwrap();
    let calls = renderer.calls.len();
    let outcome =
        run_pass(&mut fx.scene, &mut renderer, fx.surface, PassType::Lit, &settings, &mut manifest)
            .unwrap();
    assert_eq!(renderer.calls.len(), calls);
    assert_eq!(outcome.reused.len(), 2);
}

#[test]
fn test_changed_graph_invalidates_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    let mut renderer = RecordingRenderer::default();
    let mut manifest = BakeManifest::default();

    run_pass(&mut fx.scene, &mut renderer, fx.surface, PassType::Lit, &settings, &mut manifest)
        .unwrap();
    let calls = renderer.calls.len();

    fx.scene
        .material_mut(fx.socks)
        .unwrap()
        .graph
        .nodes
        .push(Node::generic("Tint").with_input("Color", SocketValue::Color([1.0, 0.0, 0.0, 1.0])));
    let outcome =
        run_pass(&mut fx.scene, &mut renderer, fx.surface, PassType::Lit, &settings, &mut manifest)
            .unwrap();

    assert_eq!(renderer.calls.len(), calls + 1);
    assert_eq!(outcome.written, vec![BakeKey::new("KK Socks", PassType::Lit)]);
    assert_eq!(outcome.reused, vec![BakeKey::new("KK Body", PassType::Lit)]);
}

#[test]
fn test_unverified_files_are_trusted() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    let mut fx = fixture();
    let mut renderer = RecordingRenderer::default();

    // A file from an older run with a stale manifest entry.
    PixelBuffer::from_pixel(4, 4, [1, 2, 3, 255])
        .save(&settings.output.file_path("KK Socks light.png"))
        .unwrap();
    let mut manifest = BakeManifest::default();
    manifest.record("KK Socks light.png", 0);

    settings.verify_fingerprints = false;
    let outcome =
        run_pass(&mut fx.scene, &mut renderer, fx.surface, PassType::Lit, &settings, &mut manifest)
            .unwrap();
    assert_eq!(outcome.reused, vec![BakeKey::new("KK Socks", PassType::Lit)]);
    assert_eq!(
        fx.scene.images.get("KK Socks light.png").unwrap().dimensions(),
        (4, 4)
    );
}

#[test]
fn test_resolution_follows_largest_image() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    let fx = fixture();

    assert_eq!(
        select_resolution(&fx.scene, fx.body, &settings).unwrap(),
        Some((512, 512))
    );
    settings.resolution_multiplier = 2.0;
    assert_eq!(
        select_resolution(&fx.scene, fx.body, &settings).unwrap(),
        Some((1024, 1024))
    );
    assert_eq!(select_resolution(&fx.scene, fx.socks, &settings).unwrap(), None);
}

#[test]
fn test_fixed_resolution_override() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    let mut fx = fixture();
    let gag = fx
        .scene
        .add_material(Material::new("KK Gag02", procedural_graph("Body Textures")));
    let plain_gag = fx
        .scene
        .add_material(Material::new("KK Gag02 plain", procedural_graph("Empty Textures")));

    settings.fixed_resolutions[0].size = 128;
    settings.resolution_multiplier = 2.0;
    assert_eq!(
        select_resolution(&fx.scene, gag, &settings).unwrap(),
        Some((256, 256))
    );
    // The override only applies when something is bound.
    assert_eq!(select_resolution(&fx.scene, plain_gag, &settings).unwrap(), None);
}

#[test]
fn test_untextured_material_falls_back_to_64() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    settings.resolution_multiplier = 3.0;
    let mut fx = fixture();
    let mut renderer = RecordingRenderer::default();

    run_pass(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        PassType::Lit,
        &settings,
        &mut BakeManifest::default(),
    )
    .unwrap();

    let socks = renderer.calls.iter().find(|c| c.material == "KK Socks").unwrap();
    assert_eq!(socks.size, (64, 64));
    let body = renderer.calls.iter().find(|c| c.material == "KK Body").unwrap();
    assert_eq!(body.size, (1536, 1536));
    assert_eq!(
        fx.scene.images.get("KK Socks light.png").unwrap().dimensions(),
        (64, 64)
    );
}

#[test]
fn test_isolation_during_render_and_restore_after() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    let original = fx.scene.surface(fx.surface).unwrap().slots.clone();
    let mut renderer = RecordingRenderer::default();

    run_pass(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        PassType::Lit,
        &settings,
        &mut BakeManifest::default(),
    )
    .unwrap();

    let body = &renderer.calls[0];
    assert_eq!(body.material, "KK Body");
    assert_eq!(body.slots, vec![fx.body, fx.neutral, fx.neutral, fx.body]);
    assert_eq!(body.toggle, Some(1.0));

    assert_eq!(fx.scene.surface(fx.surface).unwrap().slots, original);
    assert_eq!(fx.scene.capture_quad.material, None);
    assert_eq!(
        graph_of(&fx.scene, fx.body).input_value("RawShade", "Disable Normals"),
        Some(&SocketValue::Float(0.0))
    );
}

#[test]
fn test_normal_pass_rewires_output_and_restores_link() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    let mut renderer = RecordingRenderer::default();
    let original = graph_of(&fx.scene, fx.body).clone();

    run_pass(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        PassType::Normal,
        &settings,
        &mut BakeManifest::default(),
    )
    .unwrap();

    assert_eq!(
        renderer.calls[0].surface_from.as_deref(),
        Some("RawShade.Normal")
    );
    // The toggle is left alone in the normal pass.
    assert_eq!(renderer.calls[0].toggle, Some(0.0));
    assert_eq!(graph_of(&fx.scene, fx.body), &original);
    assert!(settings.output.exists("KK Body normal.png"));
}

#[test]
fn test_normal_pass_restores_multi_link_graph_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    let graph = &mut fx.scene.material_mut(fx.body).unwrap().graph;
    graph.nodes.push(Node::generic("Tint").with_output("Color"));
    graph
        .nodes
        .push(Node::generic("Mix2").with_input("A", SocketValue::Float(0.0)));
    graph.links.push(Link::new("Tint", "Color", "Mix2", "A"));
    let original = graph.clone();
    let mut renderer = RecordingRenderer::default();

    run_pass(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        PassType::Normal,
        &settings,
        &mut BakeManifest::default(),
    )
    .unwrap();
    assert_eq!(graph_of(&fx.scene, fx.body), &original);

    let calls = renderer.calls.len();
    let mut manifest = BakeManifest::load(&settings.output).unwrap();
    let outcome = run_pass(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        PassType::Normal,
        &settings,
        &mut manifest,
    )
    .unwrap();
    assert_eq!(renderer.calls.len(), calls);
    assert!(outcome.written.is_empty());
}

#[test]
fn test_shared_material_rerun_renders_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    fx.scene.add_surface(MeshSurface::new("Legs", vec![fx.body]));
    let graph = &mut fx.scene.material_mut(fx.body).unwrap().graph;
    graph.nodes.push(Node::generic("Tint").with_output("Color"));
    graph
        .nodes
        .push(Node::generic("Mix2").with_input("A", SocketValue::Float(0.0)));
    graph.links.insert(0, Link::new("Tint", "Color", "Mix2", "A"));

    let mut renderer = RecordingRenderer::default();
    let mut manifest = BakeManifest::default();
    for surface in fx.scene.surface_ids() {
        run_all(&mut fx.scene, &mut renderer, surface, &settings, &mut manifest).unwrap();
    }
    assert!(!renderer.calls.is_empty());

    let mut renderer = RecordingRenderer::default();
    let mut manifest = BakeManifest::load(&settings.output).unwrap();
    let mut summary = BakeSummary::default();
    for surface in fx.scene.surface_ids() {
        summary.merge(
            run_all(&mut fx.scene, &mut renderer, surface, &settings, &mut manifest).unwrap(),
        );
    }
    assert!(renderer.calls.is_empty());
    assert_eq!(summary.written(), 0);
    assert_eq!(summary.reused(), 9);
}

#[test]
fn test_render_failure_restores_state_then_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    let original_slots = fx.scene.surface(fx.surface).unwrap().slots.clone();
    let original_graph = graph_of(&fx.scene, fx.socks).clone();
    let mut renderer = RecordingRenderer::failing_on("KK Socks");
    let mut manifest = BakeManifest::default();

    let err = run_pass(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        PassType::Normal,
        &settings,
        &mut manifest,
    )
    .unwrap_err();

    assert!(matches!(err, BakeError::Render { ref material, .. } if material == "KK Socks"));
    assert_eq!(fx.scene.surface(fx.surface).unwrap().slots, original_slots);
    assert_eq!(graph_of(&fx.scene, fx.socks), &original_graph);
    assert_eq!(fx.scene.capture_quad.material, None);

    // Work finished before the failure stays on disk and in the manifest.
    assert!(settings.output.exists("KK Body normal.png"));
    assert!(!settings.output.exists("KK Socks normal.png"));
    let on_disk = BakeManifest::load(&settings.output).unwrap();
    assert!(on_disk.get("KK Body normal.png").is_some());
}

#[test]
fn test_missing_neutral_material_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    settings.naming.neutral_material = "Nope".to_string();
    let mut fx = fixture();
    let result = run_pass(
        &mut fx.scene,
        &mut RecordingRenderer::default(),
        fx.surface,
        PassType::Lit,
        &settings,
        &mut BakeManifest::default(),
    );
    assert!(matches!(result, Err(BakeError::MissingNeutralMaterial(_))));
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[test]
fn test_run_all_order_and_lighting_override() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    let lighting_before = fx.scene.node_group("Raw Shading").unwrap().clone();
    let mut renderer = RecordingRenderer::default();

    let summary = run_all(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        &settings,
        &mut BakeManifest::default(),
    )
    .unwrap();

    let passes: Vec<_> = summary.outcomes.iter().map(|o| o.pass).collect();
    assert_eq!(passes, PassType::ALL.to_vec());
    assert_eq!(summary.written(), 6);

    let white = SocketValue::Color([1.0, 1.0, 1.0, 1.0]);
    let black = SocketValue::Color([0.0, 0.0, 0.0, 1.0]);
    assert_eq!(renderer.calls[0].lighting.as_ref(), Some(&white));
    assert!(!renderer.calls[0].lighting_linked);
    assert_eq!(renderer.calls[2].lighting.as_ref(), Some(&black));
    assert!(!renderer.calls[2].lighting_linked);
    // Lighting is back to its linked state for the normal pass.
    assert!(renderer.calls[4].lighting_linked);

    assert_eq!(fx.scene.node_group("Raw Shading").unwrap(), &lighting_before);

    // Other surfaces are hidden while baking, visible afterwards.
    assert_eq!(renderer.calls[0].hidden, vec![false, true]);
    assert!(fx.scene.surfaces.iter().all(|s| !s.hide_render));

    let baked = summary.baked_images();
    assert_eq!(baked.get("KK Body", PassType::Unlit), Some("KK Body dark.png"));
    assert_eq!(baked.len(), 6);
}

#[test]
fn test_summary_counts_shared_marked_material_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    settings.passes.unlit = false;
    settings.passes.normal = false;
    let mut fx = fixture();
    fx.scene.add_surface(MeshSurface::new("Legs", vec![fx.body]));
    fx.scene.material_mut(fx.body).unwrap().graph.nodes.push(
        Node::generic("KK Mix").with_input("Fac", SocketValue::Float(1.0)),
    );
    let mut renderer = RecordingRenderer::default();
    let mut manifest = BakeManifest::default();

    let mut summary = BakeSummary::default();
    for surface in fx.scene.surface_ids() {
        summary.merge(
            run_all(&mut fx.scene, &mut renderer, surface, &settings, &mut manifest).unwrap(),
        );
    }

    // The marker is cleared by the first bake, so the second surface renders
    // the body again.
    assert_eq!(renderer.calls.len(), 4);
    assert_eq!(summary.written(), 3);
    assert_eq!(summary.reused(), 0);
}

#[test]
fn test_run_all_respects_pass_flags() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    settings.passes.unlit = false;
    settings.passes.normal = false;
    let mut fx = fixture();
    let mut renderer = RecordingRenderer::default();

    let summary = run_all(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        &settings,
        &mut BakeManifest::default(),
    )
    .unwrap();
    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].pass, PassType::Lit);
    assert!(!settings.output.exists("KK Body dark.png"));
}

#[test]
fn test_run_all_restores_lighting_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    let lighting_before = fx.scene.node_group("Raw Shading").unwrap().clone();
    let mut renderer = RecordingRenderer::failing_on("KK Body");

    let result = run_all(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        &settings,
        &mut BakeManifest::default(),
    );

    assert!(matches!(result, Err(BakeError::Render { .. })));
    assert_eq!(renderer.calls.len(), 1);
    assert_eq!(fx.scene.node_group("Raw Shading").unwrap(), &lighting_before);
    assert!(fx.scene.surfaces.iter().all(|s| !s.hide_render));
}

#[test]
fn test_flat_renderer_bakes_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut fx = fixture();
    let mut renderer = FlatRenderer::new(NamingConfig::default());

    let summary = run_all(
        &mut fx.scene,
        &mut renderer,
        fx.surface,
        &settings,
        &mut BakeManifest::default(),
    )
    .unwrap();
    assert_eq!(renderer.renders(), summary.written());
    let lit = fx.scene.images.get("KK Body light.png").unwrap();
    let dark = fx.scene.images.get("KK Body dark.png").unwrap();
    assert_eq!(lit.buffer.pixel(0, 0), [255, 255, 255, 255]);
    assert_eq!(dark.buffer.pixel(0, 0), [128, 128, 128, 255]);
}
