//! End-to-end checks of the extraction contract: filtering, ranking,
//! coverage accounting, determinism and error reporting.

use dominant_colors_wasm::{
    ColorResult, DominantColorExtractor, ExtractionError, ExtractorConfig, extract, report,
};
use image::{Rgb, RgbImage};

fn image_from(pixels: &[[u8; 3]], width: u32) -> RgbImage {
    let height = pixels.len() as u32 / width;
    let raw: Vec<u8> = pixels.iter().flatten().copied().collect();
    RgbImage::from_raw(width, height, raw).unwrap()
}

/// Deterministic pseudo-random image with a few loose color families.
fn noisy_image(width: u32, height: u32) -> RgbImage {
    let bases = [[180u8, 60, 40], [40, 120, 170], [90, 160, 80], [200, 190, 70]];
    let mut state = 0x2545_f491u32;
    RgbImage::from_fn(width, height, |x, y| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let base = bases[((x / 8 + y / 8) % 4) as usize];
        let jitter = |c: u8, s: u32| (c as i32 + (s % 31) as i32 - 15).clamp(0, 255) as u8;
        Rgb([
            jitter(base[0], state),
            jitter(base[1], state >> 8),
            jitter(base[2], state >> 16),
        ])
    })
}

fn assert_close(actual: [f64; 3], expected: [f64; 3]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-6, "{actual:?} != {expected:?}");
    }
}

fn coverage_sum(colors: &[ColorResult]) -> f64 {
    colors.iter().map(|c| c.coverage).sum()
}

// ============================================================================
// Contract scenarios
// ============================================================================

#[test]
fn filtering_keeps_only_mid_tones() {
    let img = image_from(&[[0, 0, 0], [255, 255, 255], [128, 128, 128], [10, 10, 10]], 2);
    let colors = extract(&img, 1).unwrap();

    assert_eq!(colors.len(), 1);
    assert_close(colors[0].centroid, [128.0, 128.0, 128.0]);
    assert_eq!(colors[0].coverage, 100.0);
    assert_eq!(colors[0].pixel_count, 1);
}

#[test]
fn known_clusters_rank_by_coverage() {
    let mut pixels = vec![[200u8, 50, 50]; 100];
    pixels.extend(vec![[50u8, 50, 200]; 300]);
    let img = image_from(&pixels, 40);

    let colors = extract(&img, 2).unwrap();

    assert_eq!(colors.len(), 2);
    assert_close(colors[0].centroid, [50.0, 50.0, 200.0]);
    assert!((colors[0].coverage - 75.0).abs() < 1e-9);
    assert_close(colors[1].centroid, [200.0, 50.0, 50.0]);
    assert!((colors[1].coverage - 25.0).abs() < 1e-9);
}

#[test]
fn too_few_distinct_colors_is_insufficient_data() {
    let mut pixels = vec![[100u8, 100, 100]; 50];
    pixels.extend(vec![[150u8, 80, 60]; 50]);
    let img = image_from(&pixels, 10);

    match extract(&img, 5) {
        Err(ExtractionError::InsufficientData { available, requested }) => {
            assert_eq!(available, 2);
            assert_eq!(requested, 5);
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

#[test]
fn fully_filtered_image_is_insufficient_data() {
    let img = image_from(&[[0, 0, 0], [255, 255, 255], [5, 240, 100], [250, 250, 10]], 2);
    let err = extract(&img, 1).unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::InsufficientData { available: 0, requested: 1 }
    ));
    assert!(err.is_recoverable());
}

#[test]
fn unfiltered_retry_recovers_extreme_images() {
    let img = image_from(&[[0, 0, 0], [0, 0, 0], [255, 255, 255], [255, 255, 255]], 2);
    assert!(extract(&img, 2).is_err());

    let extractor =
        DominantColorExtractor::new(ExtractorConfig::default().unfiltered()).unwrap();
    let colors = extractor.extract(&img, 2).unwrap();
    assert_eq!(colors.len(), 2);
    assert_eq!(colors[0].coverage, 50.0);
    assert_eq!(colors[1].coverage, 50.0);
}

#[test]
fn zero_k_is_invalid_input() {
    let img = image_from(&[[128, 128, 128]], 1);
    assert!(matches!(
        extract(&img, 0),
        Err(ExtractionError::InvalidInput { .. })
    ));
}

#[test]
fn empty_image_is_invalid_input() {
    let img = RgbImage::new(0, 0);
    assert!(matches!(
        extract(&img, 1),
        Err(ExtractionError::InvalidInput { .. })
    ));
}

#[test]
fn channel_bounds_are_exclusive() {
    let img = image_from(&[[20, 100, 100], [21, 100, 100], [100, 234, 100], [100, 100, 235]], 2);
    let colors = extract(&img, 2).unwrap();
    let total: usize = colors.iter().map(|c| c.pixel_count).sum();
    assert_eq!(total, 2);
}

// ============================================================================
// Invariants on a noisy image
// ============================================================================

#[test]
fn coverage_sums_to_one_hundred() {
    let img = noisy_image(64, 48);
    for k in 1..=6 {
        let colors = extract(&img, k).unwrap();
        assert_eq!(colors.len(), k);
        assert!((coverage_sum(&colors) - 100.0).abs() < 1e-6, "k = {k}");
    }
}

#[test]
fn output_is_sorted_by_descending_coverage() {
    let colors = extract(&noisy_image(64, 48), 6).unwrap();
    for pair in colors.windows(2) {
        assert!(pair[0].coverage >= pair[1].coverage);
    }
}

#[test]
fn repeated_calls_are_bit_identical() {
    let img = noisy_image(64, 48);
    let first = extract(&img, 4).unwrap();
    let second = extract(&img, 4).unwrap();
    for (a, b) in first.iter().zip(&second) {
        for ch in 0..3 {
            assert_eq!(a.centroid[ch].to_bits(), b.centroid[ch].to_bits());
        }
        assert_eq!(a.coverage.to_bits(), b.coverage.to_bits());
    }
}

#[test]
fn parallel_calls_agree() {
    let img = noisy_image(48, 48);
    let extractor = DominantColorExtractor::default();
    let expected = extractor.extract(&img, 3).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| extractor.extract(&img, 3).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn sampled_run_is_deterministic_and_complete() {
    let img = noisy_image(80, 80);
    let config = ExtractorConfig::default().with_sample_limit(Some(1_000));
    let extractor = DominantColorExtractor::new(config).unwrap();

    let a = extractor.extract(&img, 4).unwrap();
    let b = extractor.extract(&img, 4).unwrap();
    assert_eq!(a, b);
    assert!((coverage_sum(&a) - 100.0).abs() < 1e-6);

    let counted: usize = a.iter().map(|c| c.pixel_count).sum();
    let filtered = extractor
        .filter(dominant_colors_wasm::extractor::flatten(&img))
        .len();
    assert_eq!(counted, filtered);
}

// ============================================================================
// Export formats
// ============================================================================

#[test]
fn csv_export_follows_output_order() {
    let mut pixels = vec![[200u8, 50, 50]; 100];
    pixels.extend(vec![[50u8, 50, 200]; 300]);
    let colors = extract(&image_from(&pixels, 40), 2).unwrap();

    let csv = report::to_csv(&colors);
    assert_eq!(
        csv,
        "Ranking,HEX,RGB_R,RGB_G,RGB_B,Dominasi_Persen\n\
         1,#3232c8,50,50,200,75.0\n\
         2,#c83232,200,50,50,25.0\n"
    );
}
