//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "kiln.ron";

const APP_NAME: &str = "kiln";

/// Top-level baker configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Bake pass settings.
    pub bake: BakeConfig,
    /// Names of the shader-graph nodes, groups and sockets the baker touches.
    pub naming: NamingConfig,
    /// Atlas and finalization settings.
    pub atlas: AtlasConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Which pass types to bake.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PassFlags {
    /// Bake with the lighting network forced to white.
    pub lit: bool,
    /// Bake with the lighting network forced to black.
    pub unlit: bool,
    /// Bake the normal-channel output.
    pub normal: bool,
}

/// A fixed render edge length for materials whose name contains `material`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixedResolution {
    /// Substring matched against the material name.
    pub material: String,
    /// Edge length in pixels before the resolution multiplier is applied.
    pub size: u32,
}

/// Bake pass configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BakeConfig {
    /// Multiplier applied to the largest bound image size. Must be > 0.
    pub resolution_multiplier: f32,
    /// Enabled pass types.
    pub passes: PassFlags,
    /// Directory that receives `<material> <pass>.png` files.
    pub output_dir: PathBuf,
    /// Edge length used for materials without any bound image.
    pub fallback_resolution: u32,
    /// Per-material resolution overrides.
    pub fixed_resolutions: Vec<FixedResolution>,
    /// Only reuse an existing bake when its recorded fingerprint still matches.
    pub verify_fingerprints: bool,
}

/// Shader-graph naming conventions.
///
/// The baker never guesses at node names; every lookup goes through one of
/// these fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NamingConfig {
    /// Mix node whose blend weight marks a material as already finalized.
    pub marker_node: String,
    /// Blend-weight input on the marker node.
    pub marker_input: String,
    /// Raw shading node inside each material.
    pub raw_shade_node: String,
    /// Input on the raw shading node that toggles normal shading off.
    pub raw_shade_toggle_input: String,
    /// Output of the raw shading node carrying the normal channel.
    pub raw_shade_normal_output: String,
    /// Material output node.
    pub output_node: String,
    /// Surface input on the material output node.
    pub output_input: String,
    /// Group node that holds the material's image textures.
    pub texture_group_node: String,
    /// Shared lighting node group.
    pub lighting_group: String,
    /// Node inside the lighting group whose input is forced to a constant.
    pub lighting_break_node: String,
    /// Input on the break node that receives the lighting value.
    pub lighting_break_input: String,
    /// Fully transparent material swapped into non-baking slots.
    pub neutral_material: String,
    /// Name fragments that mark a material as an outline material.
    pub outline_markers: Vec<String>,
    /// Prefix shared by every material the finalizer replaces.
    pub bake_prefix: String,
    /// Template material copied for every finalized material.
    pub template_material: String,
    /// Image slot in the template receiving the lit image.
    pub template_main_slot: String,
    /// Image slot in the template receiving the unlit image.
    pub template_dark_slot: String,
    /// Image slot in the template receiving the normal image.
    pub template_normal_slot: String,
    /// Suffix appended to a replaced procedural material.
    pub original_suffix: String,
    /// Rim group node inside each material.
    pub rim_node: String,
    /// Rim group tree that must be switched off before baking.
    pub rim_lbs_tree: String,
    /// Rim group tree used instead.
    pub rim_none_tree: String,
    /// Shader node feeding the rim group.
    pub shader_node: String,
}

/// A fixed UV translation applied to one material on one surface before atlasing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UvOffset {
    /// Surface name.
    pub surface: String,
    /// Material name.
    pub material: String,
    /// Translation added to every face corner.
    pub offset: (f32, f32),
}

/// Atlas and finalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtlasConfig {
    /// Base name of the packed atlas images.
    pub atlas_name: String,
    /// Finalized materials rendered with alpha blending instead of clip.
    pub alpha_blend_materials: Vec<String>,
    /// Corrections applied before the compositor runs.
    pub uv_offsets: Vec<UvOffset>,
    /// Write the packed atlases next to the baked files.
    pub write_atlas: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for PassFlags {
    fn default() -> Self {
        Self {
            lit: true,
            unlit: true,
            normal: true,
        }
    }
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            resolution_multiplier: 1.0,
            passes: PassFlags::default(),
            output_dir: PathBuf::from("baked_files"),
            fallback_resolution: 64,
            fixed_resolutions: vec![FixedResolution {
                material: "KK Gag02".to_string(),
                size: 512,
            }],
            verify_fingerprints: true,
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            marker_node: "KK Mix".to_string(),
            marker_input: "Fac".to_string(),
            raw_shade_node: "RawShade".to_string(),
            raw_shade_toggle_input: "Disable Normals".to_string(),
            raw_shade_normal_output: "Normal".to_string(),
            output_node: "Material Output".to_string(),
            output_input: "Surface".to_string(),
            texture_group_node: "Gentex".to_string(),
            lighting_group: "Raw Shading".to_string(),
            lighting_break_node: "breaknode".to_string(),
            lighting_break_input: "Shading".to_string(),
            neutral_material: "KK Eyeline down".to_string(),
            outline_markers: vec!["Outline ".to_string(), " Outline".to_string()],
            bake_prefix: "KK ".to_string(),
            template_material: "KK Simple".to_string(),
            template_main_slot: "MapMain".to_string(),
            template_dark_slot: "Darktex".to_string(),
            template_normal_slot: "MapNorm".to_string(),
            original_suffix: "-ORG".to_string(),
            rim_node: "Rim".to_string(),
            rim_lbs_tree: "LBS".to_string(),
            rim_none_tree: "Rim: None".to_string(),
            shader_node: "Shader".to_string(),
        }
    }
}

impl NamingConfig {
    /// Returns `true` if `material_name` is an outline material.
    pub fn is_outline(&self, material_name: &str) -> bool {
        self.outline_markers
            .iter()
            .any(|marker| material_name.contains(marker.as_str()))
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            atlas_name: "Atlas".to_string(),
            alpha_blend_materials: [
                "KK Nose",
                "KK Eyebrows (mayuge)",
                "KK Eyeline up",
                "KK Eyeline Kage",
                "KK Eyeline down",
                "KK Eyewhites (sirome)",
                "KK EyeL (hitomi)",
                "KK EyeR (hitomi)",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            uv_offsets: vec![UvOffset {
                surface: "Body".to_string(),
                material: "KK Tongue".to_string(),
                offset: (0.0, 1.0),
            }],
            write_atlas: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for the baker, if the OS exposes one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `kiln.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Checks the values that have a legal range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let multiplier = self.bake.resolution_multiplier;
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(ConfigError::Invalid {
                field: "bake.resolution_multiplier",
                reason: format!("must be a positive number, got {multiplier}"),
            });
        }
        if self.bake.fallback_resolution == 0 {
            return Err(ConfigError::Invalid {
                field: "bake.fallback_resolution",
                reason: "must be non-zero".to_string(),
            });
        }
        if let Some(fixed) = self.bake.fixed_resolutions.iter().find(|f| f.size == 0) {
            return Err(ConfigError::Invalid {
                field: "bake.fixed_resolutions",
                reason: format!("size for `{}` must be non-zero", fixed.material),
            });
        }
        Ok(())
    }
}
