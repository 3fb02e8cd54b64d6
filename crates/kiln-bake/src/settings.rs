use kiln_config::{Config, FixedResolution, NamingConfig, PassFlags};
use kiln_scene::OutputDir;

/// Everything a bake pass reads from the configuration.
#[derive(Clone, Debug)]
pub struct BakeSettings {
    /// Directory receiving the baked files.
    pub output: OutputDir,
    /// Multiplier applied to the largest bound image.
    pub resolution_multiplier: f32,
    /// Enabled passes.
    pub passes: PassFlags,
    /// Edge length for materials without a bound image.
    pub fallback_resolution: u32,
    /// Per-material size overrides.
    pub fixed_resolutions: Vec<FixedResolution>,
    /// Require a matching fingerprint before reusing a file.
    pub verify_fingerprints: bool,
    /// Node and socket names.
    pub naming: NamingConfig,
}

impl BakeSettings {
    /// Settings taken from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            output: OutputDir::new(config.bake.output_dir.clone()),
            resolution_multiplier: config.bake.resolution_multiplier,
            passes: config.bake.passes,
            fallback_resolution: config.bake.fallback_resolution,
            fixed_resolutions: config.bake.fixed_resolutions.clone(),
            verify_fingerprints: config.bake.verify_fingerprints,
            naming: config.naming.clone(),
        }
    }

    /// Fixed edge length for `material_name`, if any override matches.
    pub fn fixed_resolution(&self, material_name: &str) -> Option<u32> {
        self.fixed_resolutions
            .iter()
            .find(|fixed| material_name.contains(fixed.material.as_str()))
            .map(|fixed| fixed.size)
    }
}
