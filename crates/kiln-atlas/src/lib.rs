//! Post-bake processing: pack the baked images into one atlas per pass and
//! swap the procedural materials for minimal baked ones.

mod compositor;
mod error;
mod finalizer;
mod offsets;

pub use compositor::{AtlasEntry, AtlasLayout, AtlasOutput, build_atlas, ceil_even};
pub use error::{AtlasError, FinalizeError};
pub use finalizer::{BuiltinTemplate, FinalizeReport, TemplateProvider, finalize_materials};
pub use offsets::apply_uv_offsets;
