//! Presentation helpers: hex strings, CSV/JSON tables and the PNG palette strip.
//!
//! The extractor only returns numbers; everything user-facing is built here.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use palette::Srgb;
use serde::Serialize;

use crate::error::{ExtractionError, Result};
use crate::extractor::ColorResult;

/// `#rrggbb` from the truncated centroid.
pub fn hex(result: &ColorResult) -> String {
    let [r, g, b] = result.rgb_u8();
    format!("#{:x}", Srgb::new(r, g, b))
}

/// Coverage rounded to one decimal place.
pub fn rounded_coverage(result: &ColorResult) -> f64 {
    (result.coverage * 10.0).round() / 10.0
}

/// Label color that stays readable on top of a swatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextContrast {
    /// Use white text
    Light,
    /// Use black text
    Dark,
}

pub fn text_contrast(result: &ColorResult) -> TextContrast {
    let sum: f64 = result.centroid.iter().sum();
    if sum < 400.0 {
        TextContrast::Light
    } else {
        TextContrast::Dark
    }
}

/// One row of the exported table.
#[derive(Debug, Clone, Serialize)]
pub struct PaletteEntry {
    pub rank: usize,
    pub hex: String,
    pub rgb: [u8; 3],
    pub coverage: f64,
}

pub fn entries(results: &[ColorResult]) -> Vec<PaletteEntry> {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| PaletteEntry {
            rank: i + 1,
            hex: hex(r),
            rgb: r.rgb_u8(),
            coverage: rounded_coverage(r),
        })
        .collect()
}

pub const CSV_HEADER: &str = "Ranking,HEX,RGB_R,RGB_G,RGB_B,Dominasi_Persen";

/// CSV table, one line per color in output order.
pub fn to_csv(results: &[ColorResult]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for e in entries(results) {
        out.push_str(&format!(
            "{},{},{},{},{},{:.1}\n",
            e.rank, e.hex, e.rgb[0], e.rgb[1], e.rgb[2], e.coverage
        ));
    }
    out
}

pub fn to_json(results: &[ColorResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&entries(results))
}

/// Horizontal bar where each color spans a width proportional to its coverage.
pub fn render_strip(results: &[ColorResult], width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    let mut start = 0u32;
    let mut cumulative = 0.0f64;

    for (i, result) in results.iter().enumerate() {
        cumulative += result.coverage;
        let end = if i + 1 == results.len() {
            width
        } else {
            ((cumulative / 100.0) * width as f64).round().clamp(0.0, width as f64) as u32
        };
        let color = Rgb(result.rgb_u8());
        for x in start..end.max(start) {
            for y in 0..height {
                img.put_pixel(x, y, color);
            }
        }
        start = end.max(start);
    }

    img
}

pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| ExtractionError::encode("PNG encode error", e))?;
    Ok(buf)
}
