use kiln_scene::MaterialId;
use serde::{Deserialize, Serialize};

use crate::pass::PassType;

const ILLEGAL_FILE_CHARS: [char; 11] = ['\\', '`', '*', '<', '>', '.', ':', '?', '|', '/', '"'];

/// Strips characters that are not allowed in file names.
pub fn sanitize_material_name(name: &str) -> String {
    name.chars()
        .filter(|c| !ILLEGAL_FILE_CHARS.contains(c))
        .collect()
}

/// Structured identity of one baked image: which material, which pass.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BakeKey {
    /// Material name at bake time.
    pub material: String,
    /// Pass type.
    pub pass: PassType,
}

impl BakeKey {
    /// Creates a key.
    pub fn new(material: impl Into<String>, pass: PassType) -> Self {
        Self {
            material: material.into(),
            pass,
        }
    }

    /// `<sanitized material> <pass token>.png`
    pub fn file_name(&self) -> String {
        format!("{} {}.png", sanitize_material_name(&self.material), self.pass)
    }
}

/// What the orchestrator does with one material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BakeDecision {
    /// The output file is reused as-is.
    Skip,
    /// Render at the resolution of the largest bound image.
    Bake,
    /// No bound image; render at the fallback resolution.
    Fallback,
}

/// A (material, pass) unit of work within one orchestrator pass.
#[derive(Clone, Debug, PartialEq)]
pub struct BakeJob {
    /// Material being baked.
    pub material: MaterialId,
    /// Structured key.
    pub key: BakeKey,
    /// Output file name inside the output directory.
    pub file_name: String,
    /// Render target `(width, height)`.
    pub resolution: (u32, u32),
    /// Fingerprint of the material's procedural configuration.
    pub fingerprint: u64,
    /// Skip, bake or fallback.
    pub decision: BakeDecision,
}
