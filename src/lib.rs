//! # Dominant Colors
//!
//! Finds the few colors that dominate an image and how much of it each one covers.
//!
//! Near-black and near-white pixels are dropped, the rest are clustered with a
//! seeded, restarted k-means in RGB space, and the clusters are ranked by the
//! share of pixels they hold. The same image and settings always give the same
//! palette.
//!
//! ```rust,no_run
//! use dominant_colors_wasm::{DominantColorExtractor, load_rgb, report};
//! use std::path::Path;
//!
//! let image = load_rgb(Path::new("photo.jpg"), Some(800))?;
//! for color in DominantColorExtractor::default().extract(&image, 5)? {
//!     println!("{} {:.1}%", report::hex(&color), color.coverage);
//! }
//! # Ok::<(), dominant_colors_wasm::ExtractionError>(())
//! ```

use image::RgbImage;
use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod extractor;
pub mod kmeans;
pub mod loader;
pub mod report;

pub use config::ExtractorConfig;
pub use error::{ExtractionError, Result};
pub use extractor::{ColorResult, DominantColorExtractor};
pub use loader::{ImageInfo, load_rgb, load_rgb_from_memory, load_rgb_with_info};

/// Size of the PNG palette strip returned to the browser.
pub const STRIP_WIDTH: u32 = 600;
pub const STRIP_HEIGHT: u32 = 120;

/// Extract `k` dominant colors with the default configuration.
pub fn extract(image: &RgbImage, k: usize) -> Result<Vec<ColorResult>> {
    DominantColorExtractor::default().extract(image, k)
}

fn to_js(err: ExtractionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Extract the dominant colors of an encoded image for a browser front-end.
///
/// Steps performed:
/// 1. Decode, convert to RGB and shrink so the longest side is at most
///    `max_side` (800 px when omitted).
/// 2. Run the extractor with its default configuration.
/// 3. Render the palette as a proportional PNG strip.
///
/// Returns `{ palette: [{ hex, rgb, coverage }], image: Uint8Array }`, with
/// the palette ordered by descending coverage.
#[wasm_bindgen]
pub fn extract_palette(
    input: Vec<u8>,
    n_colors: usize,
    max_side: Option<u32>,
) -> std::result::Result<Object, JsValue> {
    let rgb = load_rgb_from_memory(&input, Some(max_side.unwrap_or(loader::DEFAULT_MAX_SIDE)))
        .map_err(to_js)?;
    let colors = extract(&rgb, n_colors).map_err(to_js)?;

    let strip = report::render_strip(&colors, STRIP_WIDTH, STRIP_HEIGHT);
    let encoded = report::encode_png(&strip).map_err(to_js)?;

    let palette_js = Array::new();
    for (color, entry) in colors.iter().zip(report::entries(&colors)) {
        let rgb_js = Array::new();
        for channel in entry.rgb {
            rgb_js.push(&JsValue::from(channel));
        }
        let item = Object::new();
        Reflect::set(&item, &JsValue::from_str("hex"), &JsValue::from_str(&entry.hex))?;
        Reflect::set(&item, &JsValue::from_str("rgb"), &rgb_js)?;
        Reflect::set(&item, &JsValue::from_str("coverage"), &JsValue::from_f64(color.coverage))?;
        palette_js.push(&item);
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("palette"), &palette_js)?;
    Reflect::set(
        &result,
        &JsValue::from_str("image"),
        &Uint8Array::from(encoded.as_slice()),
    )?;

    Ok(result)
}

/// Native counterpart of [`extract_palette`]: decode `input` and return the
/// ranked colors using `config`.
#[cfg(not(target_arch = "wasm32"))]
pub fn extract_palette_bytes(
    input: &[u8],
    n_colors: usize,
    max_side: Option<u32>,
    config: &ExtractorConfig,
) -> Result<Vec<ColorResult>> {
    let rgb = load_rgb_from_memory(input, max_side)?;
    DominantColorExtractor::new(config.clone())?.extract(&rgb, n_colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn native_bytes_path_matches_direct_call() {
        let mut img = RgbImage::from_pixel(10, 10, Rgb([60, 120, 180]));
        for x in 0..10 {
            img.put_pixel(x, 0, Rgb([180, 90, 40]));
        }
        let png = report::encode_png(&img).unwrap();

        let from_bytes =
            extract_palette_bytes(&png, 2, None, &ExtractorConfig::default()).unwrap();
        let direct = extract(&img, 2).unwrap();
        assert_eq!(from_bytes, direct);
        assert_eq!(from_bytes[0].rgb_u8(), [60, 120, 180]);
        assert!((from_bytes[0].coverage - 90.0).abs() < 1e-9);
    }

    #[test]
    fn native_bytes_path_validates_config() {
        let png = report::encode_png(&RgbImage::from_pixel(2, 2, Rgb([90, 90, 90]))).unwrap();
        let bad = ExtractorConfig {
            n_init: 1,
            ..Default::default()
        };
        assert!(matches!(
            extract_palette_bytes(&png, 1, None, &bad),
            Err(ExtractionError::InvalidInput { .. })
        ));
    }
}
