//! `kiln`: bakes the procedural materials of a scene manifest into flat
//! images, packs them into atlases and writes the finalized scene.
//!
//! Configuration is loaded from `kiln.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p kiln-app -- --scene character.ron`.

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use kiln_app::{BAKED_SCENE_FILE_NAME, PipelineError, SceneManifest, run_pipeline, save_scene};
use kiln_bake::FlatRenderer;
use kiln_config::{CliArgs, Config};
use tracing::info;

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    kiln_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(err) = run(&args.scene, &config) {
        eprintln!("kiln: bake failed: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run(scene_path: &Path, config: &Config) -> Result<(), PipelineError> {
    let base_dir = scene_path.parent().unwrap_or_else(|| Path::new("."));
    let mut scene = SceneManifest::load(scene_path)?.into_scene(base_dir, &config.naming)?;
    let mut renderer = FlatRenderer::new(config.naming.clone());

    let report = run_pipeline(&mut scene, config, &mut renderer)?;

    let scene_out = config.bake.output_dir.join(BAKED_SCENE_FILE_NAME);
    save_scene(&scene, &scene_out)?;
    info!("Wrote {}", scene_out.display());

    println!("{}", report.summary());
    for (material, err) in &report.finalize.failed {
        eprintln!("  {material}: {err}");
    }
    Ok(())
}
