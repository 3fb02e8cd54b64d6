//! Raster buffers and the named image store.
//!
//! Every buffer operation allocates and returns a new [`PixelBuffer`]; assets
//! are never mutated in place. A transformed image is stored under a derived
//! name so the previous generation stays available.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use image::imageops::{self, FilterType};
use thiserror::Error;

const PNG_EXTENSION: &str = ".png";

// ---------------------------------------------------------------------------
// ImageError
// ---------------------------------------------------------------------------

/// Errors produced by buffer arithmetic and image I/O.
#[derive(Debug, Error)]
pub enum ImageError {
    /// PNG decode or encode failure.
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),

    /// Filesystem failure.
    #[error("image io error: {0}")]
    Io(#[from] std::io::Error),

    /// No asset with the given name is stored.
    #[error("image `{0}` not found")]
    NotFound(String),

    /// Horizontal concatenation requires equal heights.
    #[error("cannot concatenate image of height {actual} onto height {expected}")]
    HeightMismatch {
        /// Height of the first buffer.
        expected: u32,
        /// Height of the offending buffer.
        actual: u32,
    },

    /// Horizontal concatenation of zero buffers.
    #[error("cannot concatenate an empty list of images")]
    Empty,
}

// ---------------------------------------------------------------------------
// PixelBuffer
// ---------------------------------------------------------------------------

/// An 8-bit RGBA raster.
///
/// Rows are stored top to bottom, as in PNG. "Top" and "bottom" in the padding
/// operations refer to the displayed picture, so texture coordinate `v = 0`
/// lies on the last row.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// A fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// A buffer filled with one color.
    pub fn from_pixel(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, image::Rgba(rgba)),
        }
    }

    /// Wraps an existing RGBA image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Number of pixels.
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// RGBA value at `(x, y)`, with `y = 0` the top row.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Borrow the underlying image.
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume into the underlying image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Adds transparent columns on the left.
    pub fn pad_left(&self, columns: u32) -> Self {
        self.padded(columns, 0, 0, 0)
    }

    /// Adds transparent columns on the right.
    pub fn pad_right(&self, columns: u32) -> Self {
        self.padded(0, columns, 0, 0)
    }

    /// Adds transparent rows above the picture.
    pub fn pad_top(&self, rows: u32) -> Self {
        self.padded(0, 0, rows, 0)
    }

    /// Adds transparent rows below the picture.
    pub fn pad_bottom(&self, rows: u32) -> Self {
        self.padded(0, 0, 0, rows)
    }

    /// Adds rows above the picture until it is `height` rows tall. Taller
    /// buffers are returned unchanged.
    pub fn pad_to_height(&self, height: u32) -> Self {
        self.pad_top(height.saturating_sub(self.height()))
    }

    /// Adds transparent margins on every side at once.
    pub fn padded(&self, left: u32, right: u32, top: u32, bottom: u32) -> Self {
        let mut canvas = RgbaImage::new(
            self.width() + left + right,
            self.height() + top + bottom,
        );
        imageops::replace(&mut canvas, &self.image, i64::from(left), i64::from(top));
        Self { image: canvas }
    }

    /// Places `parts` left to right in order. All parts must share a height.
    pub fn concat_horizontal(parts: &[&PixelBuffer]) -> Result<Self, ImageError> {
        let first = parts.first().ok_or(ImageError::Empty)?;
        let height = first.height();
        let mut width = 0u32;
        for part in parts {
            if part.height() != height {
                return Err(ImageError::HeightMismatch {
                    expected: height,
                    actual: part.height(),
                });
            }
            width += part.width();
        }

        let mut canvas = RgbaImage::new(width, height);
        let mut x = 0i64;
        for part in parts {
            imageops::replace(&mut canvas, &part.image, x, 0);
            x += i64::from(part.width());
        }
        Ok(Self { image: canvas })
    }

    /// Resamples to exactly `width × height`.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        Self {
            image: imageops::resize(&self.image, width, height, FilterType::Triangle),
        }
    }

    /// Decodes a PNG from disk.
    pub fn load(path: &Path) -> Result<Self, ImageError> {
        Ok(Self {
            image: image::open(path)?.to_rgba8(),
        })
    }

    /// Encodes as an 8-bit RGBA PNG, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ImageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ImageAsset / ImageStore
// ---------------------------------------------------------------------------

/// A named raster buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageAsset {
    /// Unique name within the store (usually a file name).
    pub name: String,
    /// Pixel data.
    pub buffer: PixelBuffer,
}

impl ImageAsset {
    /// Creates a new asset.
    pub fn new(name: impl Into<String>, buffer: PixelBuffer) -> Self {
        Self {
            name: name.into(),
            buffer,
        }
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }
}

/// Namespace mapping image names to raster buffers.
#[derive(Clone, Debug, Default)]
pub struct ImageStore {
    assets: HashMap<String, ImageAsset>,
}

impl ImageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an asset, returning its name.
    pub fn insert(&mut self, asset: ImageAsset) -> String {
        let name = asset.name.clone();
        self.assets.insert(name.clone(), asset);
        name
    }

    /// Looks up an asset by name.
    pub fn get(&self, name: &str) -> Option<&ImageAsset> {
        self.assets.get(name)
    }

    /// Looks up an asset by name, failing if it is absent.
    pub fn require(&self, name: &str) -> Result<&ImageAsset, ImageError> {
        self.get(name)
            .ok_or_else(|| ImageError::NotFound(name.to_string()))
    }

    /// Returns `true` if an asset with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    /// Number of stored assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns `true` if the store holds no assets.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Name for a derived generation of `name`: `suffix` goes before the
    /// `.png` extension and is repeated until the name is unused.
    pub fn derive_name(&self, name: &str, suffix: &str) -> String {
        let mut candidate = insert_suffix(name, suffix);
        while self.contains(&candidate) {
            candidate = insert_suffix(&candidate, suffix);
        }
        candidate
    }

    /// Decodes `path` and stores it under `name`.
    pub fn load_png(&mut self, name: &str, path: &Path) -> Result<&ImageAsset, ImageError> {
        let buffer = PixelBuffer::load(path)?;
        self.assets
            .insert(name.to_string(), ImageAsset::new(name, buffer));
        self.require(name)
    }

    /// Encodes the named asset to `path`.
    pub fn save_png(&self, name: &str, path: &Path) -> Result<(), ImageError> {
        self.require(name)?.buffer.save(path)
    }
}

fn insert_suffix(name: &str, suffix: &str) -> String {
    match name.strip_suffix(PNG_EXTENSION) {
        Some(stem) => format!("{stem}{suffix}{PNG_EXTENSION}"),
        None => format!("{name}{suffix}"),
    }
}

// ---------------------------------------------------------------------------
// OutputDir
// ---------------------------------------------------------------------------

/// Directory that receives baked files, with the existence check used for
/// resuming interrupted runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Wraps a directory path. Nothing is created on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory itself.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Full path of a file inside the directory.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Returns `true` if `file_name` exists as a regular file.
    pub fn exists(&self, file_name: &str) -> bool {
        self.file_path(file_name).is_file()
    }

    /// Creates the directory if it is missing.
    pub fn ensure(&self) -> Result<(), ImageError> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }
}
