//! Face-corner texture coordinate access.

use glam::Vec2;

use crate::scene::{MaterialId, Scene, SceneError, SurfaceId};

/// A per-axis affine rewrite applied to texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UvOp {
    /// `uv + v`
    Add(Vec2),
    /// `uv - v`
    Sub(Vec2),
    /// `uv * v`
    Mul(Vec2),
    /// `uv / v`
    Div(Vec2),
}

impl UvOp {
    /// Applies the operation to one coordinate.
    pub fn apply(self, uv: Vec2) -> Vec2 {
        match self {
            Self::Add(v) => uv + v,
            Self::Sub(v) => uv - v,
            Self::Mul(v) => uv * v,
            Self::Div(v) => uv / v,
        }
    }
}

/// Axis-aligned bounds of a set of texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvBounds {
    /// Component-wise minimum.
    pub min: Vec2,
    /// Component-wise maximum.
    pub max: Vec2,
}

impl UvBounds {
    /// Bounds of `points`, or `None` when empty.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(
            Self {
                min: first,
                max: first,
            },
            |b, p| Self {
                min: b.min.min(p),
                max: b.max.max(p),
            },
        ))
    }
}

impl Scene {
    /// Every face-corner coordinate on `surface` whose face slot binds `material`.
    pub fn face_corners(
        &self,
        surface: SurfaceId,
        material: MaterialId,
    ) -> Result<Vec<Vec2>, SceneError> {
        let target = self.surface(surface)?;
        Ok(target
            .faces
            .iter()
            .filter(|face| target.slots.get(face.slot) == Some(&material))
            .flat_map(|face| face.uvs.iter().copied())
            .collect())
    }

    /// Bounds of the coordinates selected by [`Scene::face_corners`].
    pub fn uv_bounds(
        &self,
        surface: SurfaceId,
        material: MaterialId,
    ) -> Result<Option<UvBounds>, SceneError> {
        Ok(UvBounds::from_points(self.face_corners(surface, material)?))
    }

    /// Rewrites in place every coordinate selected by [`Scene::face_corners`].
    /// Returns the number of corners touched.
    pub fn transform_uvs(
        &mut self,
        surface: SurfaceId,
        material: MaterialId,
        op: UvOp,
    ) -> Result<usize, SceneError> {
        let target = self.surface_mut(surface)?;
        let slots = &target.slots;
        let mut touched = 0;
        for face in &mut target.faces {
            if slots.get(face.slot) != Some(&material) {
                continue;
            }
            for uv in &mut face.uvs {
                *uv = op.apply(*uv);
                touched += 1;
            }
        }
        Ok(touched)
    }
}
