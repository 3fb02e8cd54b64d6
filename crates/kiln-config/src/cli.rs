//! Command-line argument parsing for the baker.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Kiln command-line arguments.
///
/// CLI values override settings loaded from `kiln.ron`.
#[derive(Parser, Debug)]
#[command(name = "kiln", about = "Bake procedural materials into a packed texture atlas")]
pub struct CliArgs {
    /// Scene manifest (RON) describing materials, surfaces and images.
    #[arg(long)]
    pub scene: PathBuf,

    /// Directory receiving the baked images.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Resolution multiplier applied to the largest bound image.
    #[arg(long)]
    pub multiplier: Option<f32>,

    /// Skip the lit pass.
    #[arg(long)]
    pub no_lit: bool,

    /// Skip the unlit pass.
    #[arg(long)]
    pub no_unlit: bool,

    /// Skip the normal pass.
    #[arg(long)]
    pub no_normal: bool,

    /// Write the packed atlases to the output directory.
    #[arg(long)]
    pub write_atlas: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref dir) = args.output_dir {
            self.bake.output_dir = dir.clone();
        }
        if let Some(m) = args.multiplier {
            self.bake.resolution_multiplier = m;
        }
        if args.no_lit {
            self.bake.passes.lit = false;
        }
        if args.no_unlit {
            self.bake.passes.unlit = false;
        }
        if args.no_normal {
            self.bake.passes.normal = false;
        }
        if let Some(write) = args.write_atlas {
            self.atlas.write_atlas = write;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
