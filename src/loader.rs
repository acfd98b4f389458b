//! Decoding and normalization of input images.
//!
//! Whatever the source mode (grayscale, RGBA, palette, 16-bit), the
//! extractor receives an 8-bit RGB grid. Alpha is dropped, never blended.

use std::path::Path;

use image::{DynamicImage, GenericImageView, RgbImage, imageops::FilterType};
use serde::Serialize;

use crate::error::{ExtractionError, Result};

/// Longest side kept by the interactive front-ends.
pub const DEFAULT_MAX_SIDE: u32 = 800;

/// Basic facts about a decoded image, for display next to the palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub color_type: String,
}

impl ImageInfo {
    pub fn of(img: &DynamicImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            color_type: format!("{:?}", img.color()),
        }
    }
}

pub fn load_rgb_from_memory(bytes: &[u8], max_side: Option<u32>) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ExtractionError::image_decode("Unable to decode image", e))?;
    to_rgb(&img, max_side)
}

pub fn load_rgb(path: &Path, max_side: Option<u32>) -> Result<RgbImage> {
    load_rgb_with_info(path, max_side).map(|(rgb, _)| rgb)
}

/// Like [`load_rgb`], also reporting the file's original size and mode.
pub fn load_rgb_with_info(path: &Path, max_side: Option<u32>) -> Result<(RgbImage, ImageInfo)> {
    let img = image::open(path).map_err(|e| {
        ExtractionError::image_decode(format!("Unable to open {}", path.display()), e)
    })?;
    let info = ImageInfo::of(&img);
    Ok((to_rgb(&img, max_side)?, info))
}

/// Convert to 8-bit RGB, shrinking first so the longest side is at most
/// `max_side`. Aspect ratio is kept and small images are never enlarged.
pub fn to_rgb(img: &DynamicImage, max_side: Option<u32>) -> Result<RgbImage> {
    let rgb = img.to_rgb8();
    let Some(limit) = max_side else {
        return Ok(rgb);
    };
    if limit == 0 {
        return Err(ExtractionError::invalid_input("max_side must be positive"));
    }

    let (orig_w, orig_h) = rgb.dimensions();
    let longest = orig_w.max(orig_h);
    if longest <= limit {
        return Ok(rgb);
    }

    let ratio = limit as f32 / longest as f32;
    let w = ((orig_w as f32) * ratio).round().max(1.0) as u32;
    let h = ((orig_h as f32) * ratio).round().max(1.0) as u32;
    log::debug!("downscaling {orig_w}x{orig_h} to {w}x{h}");
    Ok(image::imageops::resize(&rgb, w, h, FilterType::Lanczos3))
}
