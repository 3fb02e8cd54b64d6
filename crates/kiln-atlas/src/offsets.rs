use glam::Vec2;
use kiln_config::UvOffset;
use kiln_scene::{Scene, UvOp};
use tracing::debug;

use crate::error::AtlasError;

/// Translates the coordinates of each configured `(surface, material)` pair.
/// Pairs naming a surface or material the scene lacks are skipped. Returns
/// the number of corners moved.
pub fn apply_uv_offsets(scene: &mut Scene, offsets: &[UvOffset]) -> Result<usize, AtlasError> {
    let mut moved = 0;
    for offset in offsets {
        let (Some(surface), Some(material)) = (
            scene.surface_id(&offset.surface),
            scene.material_id(&offset.material),
        ) else {
            debug!(
                "No {} on {}, offset skipped",
                offset.material, offset.surface
            );
            continue;
        };
        let (u, v) = offset.offset;
        moved += scene.transform_uvs(surface, material, UvOp::Add(Vec2::new(u, v)))?;
    }
    Ok(moved)
}
