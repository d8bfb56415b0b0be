//! Loaded screenshots.
//!
//! An [`ImageHandle`] owns decoded RGB pixels plus the metadata used to name
//! output files. Sub-regions are read with [`ImageHandle::crop`] and written
//! back with [`ImageHandle::paste`].

use std::path::{Path, PathBuf};

use image::{imageops, Rgb, RgbImage};
use imgref::{ImgRef, ImgVec};
use rgb::RGB8;

use crate::consts::PAD_COLOR;
use crate::hash::HashAlgorithm;
use crate::region::Region;
use crate::session::Method;
use crate::DiffError;

/// Decoded RGB image with cached name and extension.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    pixels: RgbImage,
    name: String,
    ext: String,
    path: Option<PathBuf>,
}

impl ImageHandle {
    /// Loads an image file, converting it to 8-bit RGB.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DiffError> {
        let path = path.as_ref();
        let pixels = image::open(path)?.to_rgb8();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
            .to_string();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("png")
            .to_ascii_lowercase();
        log::debug!(
            "loaded {} ({}x{})",
            path.display(),
            pixels.width(),
            pixels.height()
        );
        Ok(Self {
            pixels,
            name,
            ext,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wraps in-memory pixels. The extension defaults to `png`.
    pub fn from_rgb(name: impl Into<String>, pixels: RgbImage) -> Self {
        Self {
            pixels,
            name: name.into(),
            ext: "png".to_string(),
            path: None,
        }
    }

    /// Copies a raw `RGB8` buffer (stride is honored).
    pub fn from_imgref(name: impl Into<String>, img: ImgRef<'_, RGB8>) -> Self {
        let mut pixels = RgbImage::new(img.width() as u32, img.height() as u32);
        for (y, row) in img.rows().enumerate() {
            for (x, px) in row.iter().enumerate() {
                pixels.put_pixel(x as u32, y as u32, Rgb([px.r, px.g, px.b]));
            }
        }
        Self::from_rgb(name, pixels)
    }

    /// Overrides the extension used for output naming.
    #[must_use]
    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Copies out the pixels under `region`, clipped to the image bounds.
    ///
    /// A region entirely outside the image yields an empty patch.
    pub fn crop(&self, region: Region) -> RgbImage {
        match region.clip(self.width(), self.height()) {
            Some(r) => {
                imageops::crop_imm(&self.pixels, r.x1(), r.y1(), r.width(), r.height()).to_image()
            }
            None => RgbImage::new(0, 0),
        }
    }

    /// Writes `patch` with its top-left corner at `(x, y)`. Pixels falling
    /// outside the image are dropped.
    pub fn paste(&mut self, patch: &RgbImage, x: u32, y: u32) {
        imageops::replace(&mut self.pixels, patch, i64::from(x), i64::from(y));
    }

    /// Copies the pixels into a tightly packed `ImgVec`, for callers working
    /// on raw buffers.
    pub fn to_imgvec(&self) -> ImgVec<RGB8> {
        let buf: Vec<RGB8> = self
            .pixels
            .pixels()
            .map(|p| RGB8::new(p.0[0], p.0[1], p.0[2]))
            .collect();
        ImgVec::new(buf, self.width() as usize, self.height() as usize)
    }

    /// Pads with white on the right and bottom to `width x height`.
    ///
    /// Does nothing if the image already has at least that size.
    pub fn pad_to(&mut self, width: u32, height: u32) {
        let (w, h) = self.dimensions();
        if w >= width && h >= height {
            return;
        }
        let mut canvas = RgbImage::from_pixel(width.max(w), height.max(h), Rgb(PAD_COLOR));
        imageops::replace(&mut canvas, &self.pixels, 0, 0);
        log::debug!(
            "padded {} from {w}x{h} to {}x{}",
            self.name,
            canvas.width(),
            canvas.height()
        );
        self.pixels = canvas;
    }

    /// Pads with white so both dimensions are multiples of `block`.
    ///
    /// # Errors
    /// Returns [`DiffError::InvalidBlockSize`] when `block` is zero.
    pub fn extend_to_multiple(&mut self, block: u32) -> Result<(), DiffError> {
        if block == 0 {
            return Err(DiffError::InvalidBlockSize(block));
        }
        let (w, h) = self.dimensions();
        self.pad_to(w.div_ceil(block) * block, h.div_ceil(block) * block);
        Ok(())
    }

    /// Encodes the pixels to `path`; the format follows the path extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DiffError> {
        self.pixels.save(path.as_ref())?;
        Ok(())
    }
}

/// Makes both images the same size by padding the smaller one with white.
///
/// The common size is the larger width by the larger height, so an image
/// can grow in one dimension even when it is the bigger of the two.
pub fn normalize_pair(reference: &mut ImageHandle, candidate: &mut ImageHandle) {
    if reference.dimensions() == candidate.dimensions() {
        return;
    }
    let width = reference.width().max(candidate.width());
    let height = reference.height().max(candidate.height());
    reference.pad_to(width, height);
    candidate.pad_to(width, height);
}

/// Default output file name:
/// `output_{method}_{id}_{reference}_{candidate}_{algorithm}.{ext}`.
///
/// `method` is abbreviated to three letters and the extension is taken from
/// the reference image.
pub fn output_file_name(
    method: Method,
    output_id: &str,
    reference: &ImageHandle,
    candidate: &ImageHandle,
    algorithm: HashAlgorithm,
) -> String {
    let method: String = method.name().chars().take(3).collect();
    format!(
        "output_{method}_{output_id}_{}_{}_{algorithm}.{}",
        reference.name(),
        candidate.name(),
        reference.ext()
    )
}
