//! Atlas compositor: fixes out-of-range texture coordinates, equalizes image
//! heights, packs every baked image left to right and rewrites coordinates
//! into atlas space.
//!
//! Layout is driven by the primary pass, the first of lit, unlit and normal
//! that produced any image. Companion passes receive the same padding and
//! land in the same atlas regions, so one set of coordinates serves every
//! pass.

use glam::Vec2;
use kiln_bake::{BakeKey, BakedImages, PassType};
use kiln_config::AtlasConfig;
use kiln_scene::{ImageAsset, MaterialId, PixelBuffer, Scene, SurfaceId, UvBounds, UvOp};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::error::AtlasError;

/// Slack absorbed before rounding pixel amounts up, so float noise in
/// `0.25 * 100.0` does not cost an extra column.
const PIXEL_EPSILON: f32 = 1e-3;

/// Rounds a pixel amount up to the next even integer.
pub fn ceil_even(pixels: f32) -> u32 {
    if pixels <= PIXEL_EPSILON {
        return 0;
    }
    let whole = (pixels - PIXEL_EPSILON).ceil() as u32;
    whole + whole % 2
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// One material's region in the atlas.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasEntry {
    /// Material owning the region.
    pub material: MaterialId,
    /// Material name (the key into [`BakedImages`]).
    pub material_name: String,
    /// Surface where the material was first encountered.
    pub surface: SurfaceId,
    /// Final primary-pass image placed in the region.
    pub image: String,
    /// Left edge of the region in pixels.
    pub x_offset: u32,
    /// Region width in pixels.
    pub width: u32,
}

/// Ordered regions plus the atlas dimensions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AtlasLayout {
    /// Regions in traversal order.
    pub entries: Vec<AtlasEntry>,
    /// Sum of all region widths.
    pub width: u32,
    /// Common height.
    pub height: u32,
}

impl AtlasLayout {
    /// Returns `true` if nothing was packed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Region of `material`, if it participates.
    pub fn entry(&self, material: MaterialId) -> Option<&AtlasEntry> {
        self.entries.iter().find(|e| e.material == material)
    }
}

/// Result of [`build_atlas`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AtlasOutput {
    /// Region layout.
    pub layout: AtlasLayout,
    /// Pass that drove the layout.
    pub primary: Option<PassType>,
    /// Atlas image name per pass, in pass order.
    pub atlases: Vec<(PassType, String)>,
}

impl AtlasOutput {
    /// Atlas image for `pass`.
    pub fn atlas(&self, pass: PassType) -> Option<&str> {
        self.atlases
            .iter()
            .find(|(p, _)| *p == pass)
            .map(|(_, name)| name.as_str())
    }

    /// `baked` with every packed material pointed at the atlas images.
    pub fn bindings(&self, baked: &BakedImages) -> BakedImages {
        let mut bound = baked.clone();
        for entry in &self.layout.entries {
            for (pass, atlas) in &self.atlases {
                bound.insert(BakeKey::new(entry.material_name.clone(), *pass), atlas.clone());
            }
        }
        bound
    }
}

// ---------------------------------------------------------------------------
// build_atlas
// ---------------------------------------------------------------------------

/// Pixel margins added around a material's original bake.
#[derive(Clone, Copy, Debug, Default)]
struct Padding {
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
}

struct Participant {
    material: MaterialId,
    name: String,
    surface: SurfaceId,
    surfaces: Vec<SurfaceId>,
    /// Current primary image; repointed after every correction.
    image: String,
    /// Size of the original primary bake.
    base: (u32, u32),
    padding: Padding,
    /// Generation suffixes applied so far, in order.
    suffixes: String,
}

/// Packs every baked material into one atlas per pass and rewrites the
/// texture coordinates of every surface using those materials.
///
/// Traversal is surface order, then slot order; a material joins the atlas at
/// its first encounter. Materials without an image in the primary pass keep
/// their coordinates. Intermediate images are stored under derived names and
/// the originals are left untouched.
pub fn build_atlas(
    scene: &mut Scene,
    baked: &BakedImages,
    config: &AtlasConfig,
) -> Result<AtlasOutput, AtlasError> {
    let Some(primary) = PassType::ALL
        .into_iter()
        .find(|&pass| baked.iter().any(|(key, _)| key.pass == pass))
    else {
        info!("Nothing baked, skipping atlas");
        return Ok(AtlasOutput::default());
    };

    let mut participants = collect_participants(scene, baked, primary)?;
    if participants.is_empty() {
        info!("No material has a {primary} image, skipping atlas");
        return Ok(AtlasOutput::default());
    }

    for participant in &mut participants {
        fix_underflow(scene, participant)?;
        fix_overflow(scene, participant)?;
    }
    let height = equalize_heights(scene, &mut participants)?;
    let layout = pack_layout(scene, &participants, height)?;

    let mut atlases = Vec::new();
    for pass in PassType::ALL {
        let name = atlas_name(config, pass);
        let built = if pass == primary {
            compose(scene, &name, participants.iter().map(|p| p.image.clone()).collect())?
        } else {
            compose_companion(scene, baked, &participants, pass, &name)?
        };
        if built {
            atlases.push((pass, name));
        }
    }

    info!(
        "Atlas {}x{} with {} region(s), passes: {}",
        layout.width,
        layout.height,
        layout.entries.len(),
        atlases
            .iter()
            .map(|(pass, _)| pass.token())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(AtlasOutput {
        layout,
        primary: Some(primary),
        atlases,
    })
}

fn atlas_name(config: &AtlasConfig, pass: PassType) -> String {
    format!("{} {}.png", config.atlas_name, pass)
}

fn collect_participants(
    scene: &Scene,
    baked: &BakedImages,
    primary: PassType,
) -> Result<Vec<Participant>, AtlasError> {
    let mut seen = FxHashSet::default();
    let mut participants = Vec::new();
    for surface in scene.surface_ids() {
        for &material in &scene.surface(surface)?.slots {
            if !seen.insert(material) {
                continue;
            }
            let name = scene.material(material)?.name.clone();
            let Some(image) = baked.get(&name, primary) else {
                debug!("{name} has no {primary} image, left out of the atlas");
                continue;
            };
            let base = scene.images.require(image)?.dimensions();
            participants.push(Participant {
                material,
                surface,
                surfaces: scene.surfaces_using(material),
                image: image.to_string(),
                base,
                padding: Padding::default(),
                suffixes: String::new(),
                name,
            });
        }
    }
    Ok(participants)
}

fn union_bounds(scene: &Scene, participant: &Participant) -> Result<Option<UvBounds>, AtlasError> {
    let mut union: Option<UvBounds> = None;
    for &surface in &participant.surfaces {
        let Some(bounds) = scene.uv_bounds(surface, participant.material)? else {
            continue;
        };
        union = Some(match union {
            Some(u) => UvBounds {
                min: u.min.min(bounds.min),
                max: u.max.max(bounds.max),
            },
            None => bounds,
        });
    }
    Ok(union)
}

fn transform(scene: &mut Scene, participant: &Participant, op: UvOp) -> Result<(), AtlasError> {
    for &surface in &participant.surfaces {
        scene.transform_uvs(surface, participant.material, op)?;
    }
    Ok(())
}

/// Stores `buffer` as the next generation of the participant's image.
fn repoint(scene: &mut Scene, participant: &mut Participant, buffer: PixelBuffer, suffix: &str) {
    let name = scene.images.derive_name(&participant.image, suffix);
    participant.image = scene.images.insert(ImageAsset::new(name, buffer));
    participant.suffixes.push_str(suffix);
}

/// Coordinates below zero: grow the canvas left and down, shift the
/// coordinates so the minimum lands on zero, and renormalize to the grown
/// canvas.
fn fix_underflow(scene: &mut Scene, participant: &mut Participant) -> Result<(), AtlasError> {
    let Some(bounds) = union_bounds(scene, participant)? else {
        return Ok(());
    };
    let below = (-bounds.min).max(Vec2::ZERO);
    if below == Vec2::ZERO {
        return Ok(());
    }

    let current = scene.images.require(&participant.image)?.buffer.clone();
    let (width, height) = current.dimensions();
    let pad_x = ceil_even(below.x * width as f32);
    let pad_y = ceil_even(below.y * height as f32);
    let grown = Vec2::new((width + pad_x) as f32, (height + pad_y) as f32);
    let size = Vec2::new(width as f32, height as f32);

    debug!(
        "{}: coordinates below zero by {below}, padding left {pad_x} bottom {pad_y}",
        participant.name
    );
    transform(scene, participant, UvOp::Add(below))?;
    transform(scene, participant, UvOp::Mul(size / grown))?;

    participant.padding.left += pad_x;
    participant.padding.bottom += pad_y;
    repoint(scene, participant, current.padded(pad_x, 0, 0, pad_y), "n");
    Ok(())
}

/// Coordinates above one: grow the canvas right and up, and scale the
/// coordinates down into the grown canvas.
fn fix_overflow(scene: &mut Scene, participant: &mut Participant) -> Result<(), AtlasError> {
    let Some(bounds) = union_bounds(scene, participant)? else {
        return Ok(());
    };
    let above = (bounds.max - Vec2::ONE).max(Vec2::ZERO);
    if above == Vec2::ZERO {
        return Ok(());
    }

    let current = scene.images.require(&participant.image)?.buffer.clone();
    let (width, height) = current.dimensions();
    let pad_x = ceil_even(above.x * width as f32);
    let pad_y = ceil_even(above.y * height as f32);
    let grown = Vec2::new((width + pad_x) as f32, (height + pad_y) as f32);
    let size = Vec2::new(width as f32, height as f32);

    debug!(
        "{}: coordinates above one by {above}, padding right {pad_x} top {pad_y}",
        participant.name
    );
    transform(scene, participant, UvOp::Mul(size / grown))?;

    participant.padding.right += pad_x;
    participant.padding.top += pad_y;
    repoint(scene, participant, current.padded(0, pad_x, pad_y, 0), "p");
    Ok(())
}

/// Top-pads every image to the tallest one and compresses its coordinates
/// vertically to match. Returns the common height.
fn equalize_heights(scene: &mut Scene, participants: &mut [Participant]) -> Result<u32, AtlasError> {
    let mut max_height = 0;
    for participant in participants.iter() {
        max_height = max_height.max(scene.images.require(&participant.image)?.buffer.height());
    }

    for participant in participants.iter_mut() {
        let current = scene.images.require(&participant.image)?.buffer.clone();
        let height = current.height();
        if height == max_height {
            continue;
        }
        let factor = height as f32 / max_height as f32;
        debug!(
            "{}: extending {height} to {max_height} rows",
            participant.name
        );
        transform(scene, participant, UvOp::Mul(Vec2::new(1.0, factor)))?;
        participant.padding.top += max_height - height;
        repoint(scene, participant, current.pad_to_height(max_height), "f");
    }
    Ok(max_height)
}

/// Assigns regions in traversal order and moves every material's coordinates
/// into its region.
fn pack_layout(
    scene: &mut Scene,
    participants: &[Participant],
    height: u32,
) -> Result<AtlasLayout, AtlasError> {
    let mut widths = Vec::with_capacity(participants.len());
    for participant in participants {
        widths.push(scene.images.require(&participant.image)?.buffer.width());
    }
    let total: u32 = widths.iter().sum();
    let total_f = total as f32;

    let mut entries = Vec::with_capacity(participants.len());
    let mut x_offset = 0u32;
    for (participant, &width) in participants.iter().zip(&widths) {
        transform(
            scene,
            participant,
            UvOp::Mul(Vec2::new(width as f32 / total_f, 1.0)),
        )?;
        transform(
            scene,
            participant,
            UvOp::Add(Vec2::new(x_offset as f32 / total_f, 0.0)),
        )?;
        entries.push(AtlasEntry {
            material: participant.material,
            material_name: participant.name.clone(),
            surface: participant.surface,
            image: participant.image.clone(),
            x_offset,
            width,
        });
        x_offset += width;
    }

    Ok(AtlasLayout {
        entries,
        width: total,
        height,
    })
}

/// Concatenates the named images into `atlas`. Returns `false` if `images`
/// is empty.
fn compose(scene: &mut Scene, atlas: &str, images: Vec<String>) -> Result<bool, AtlasError> {
    if images.is_empty() {
        return Ok(false);
    }
    let mut parts = Vec::with_capacity(images.len());
    for image in &images {
        parts.push(&scene.images.require(image)?.buffer);
    }
    let buffer = PixelBuffer::concat_horizontal(&parts)?;
    scene.images.insert(ImageAsset::new(atlas, buffer));
    Ok(true)
}

/// Pads each material's `pass` image exactly like its primary image and packs
/// them into `atlas`. Materials without an image for `pass` leave a
/// transparent region. Returns `false` if no material has one.
fn compose_companion(
    scene: &mut Scene,
    baked: &BakedImages,
    participants: &[Participant],
    pass: PassType,
    atlas: &str,
) -> Result<bool, AtlasError> {
    if !participants
        .iter()
        .any(|p| baked.get(&p.name, pass).is_some())
    {
        return Ok(false);
    }

    let mut images = Vec::with_capacity(participants.len());
    for participant in participants {
        let final_size = scene.images.require(&participant.image)?.dimensions();
        let Some(source) = baked.get(&participant.name, pass) else {
            let name = format!("{} {pass} blank.png", participant.name);
            let blank = PixelBuffer::new(final_size.0, final_size.1);
            images.push(scene.images.insert(ImageAsset::new(name, blank)));
            continue;
        };

        let asset = scene.images.require(source)?;
        let (width, height) = participant.base;
        if participant.suffixes.is_empty() && asset.dimensions() == (width, height) {
            images.push(source.to_string());
            continue;
        }
        let Padding {
            left,
            right,
            top,
            bottom,
        } = participant.padding;
        let buffer = asset
            .buffer
            .resized(width, height)
            .padded(left, right, top, bottom);
        let mut name = source.to_string();
        for suffix in participant.suffixes.chars() {
            name = scene.images.derive_name(&name, suffix.encode_utf8(&mut [0; 4]));
        }
        if name == source {
            name = scene.images.derive_name(source, "r");
        }
        images.push(scene.images.insert(ImageAsset::new(name, buffer)));
    }
    compose(scene, atlas, images)
}
