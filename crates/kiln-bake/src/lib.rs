//! Bake passes: isolate each material, render it to a flat image, restore the
//! scene.
//!
//! [`run_pass`] bakes one pass type for one surface. [`run_all`] drives the
//! lit, unlit and normal passes in order and owns the shared lighting
//! override. Already-written files are reused on re-runs, checked against the
//! fingerprints in [`BakeManifest`].

mod baked;
mod controller;
mod error;
mod job;
mod manifest;
mod orchestrator;
mod pass;
mod renderer;
mod rim;
mod settings;

#[cfg(test)]
mod tests;

pub use baked::BakedImages;
pub use controller::{BakeSummary, run_all};
pub use error::{BakeError, RenderError};
pub use job::{BakeDecision, BakeJob, BakeKey, sanitize_material_name};
pub use manifest::{BakeManifest, MANIFEST_FILE_NAME, fingerprint};
pub use orchestrator::{PassOutcome, run_pass, select_resolution};
pub use pass::PassType;
pub use renderer::{FlatRenderer, OutputFormat, RenderRequest, Renderer};
pub use rim::normalize_rim_groups;
pub use settings::BakeSettings;
