//! Dominant color extraction: flatten, filter, cluster, measure, rank.

use std::collections::HashSet;

use image::RgbImage;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::ExtractorConfig;
use crate::error::{ExtractionError, Result};
use crate::kmeans::{self, KmeansParams, Point};

/// One representative color and the share of qualifying pixels it covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorResult {
    /// Mean RGB of the cluster, channels in 0.0..=255.0
    pub centroid: [f64; 3],
    /// Percentage of filtered pixels assigned to this cluster
    pub coverage: f64,
    /// Number of filtered pixels assigned to this cluster
    pub pixel_count: usize,
}

impl ColorResult {
    /// Centroid channels truncated toward zero
    pub fn rgb_u8(&self) -> [u8; 3] {
        [
            self.centroid[0] as u8,
            self.centroid[1] as u8,
            self.centroid[2] as u8,
        ]
    }
}

/// Stateless extractor; share it freely across threads.
#[derive(Debug, Clone, Default)]
pub struct DominantColorExtractor {
    config: ExtractorConfig,
}

impl DominantColorExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the `k` dominant colors of `image`, most common first.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `k` is zero, the image has no pixels, or the
    ///   configured `sample_limit` is smaller than `k`
    /// - `InsufficientData` if fewer than `k` pixels, or fewer than `k`
    ///   distinct colors, survive the extremes filter
    pub fn extract(&self, image: &RgbImage, k: usize) -> Result<Vec<ColorResult>> {
        if k < 1 {
            return Err(ExtractionError::invalid_input("k must be at least 1"));
        }
        let total = image.width() as usize * image.height() as usize;
        if total == 0 {
            return Err(ExtractionError::invalid_input("image has no pixels"));
        }
        if let Some(limit) = self.config.sample_limit.filter(|&l| l < k) {
            return Err(ExtractionError::invalid_input(format!(
                "sample_limit ({limit}) must be at least k ({k})"
            )));
        }

        let filtered = self.filter(flatten(image));
        if filtered.len() < k {
            return Err(ExtractionError::InsufficientData {
                available: filtered.len(),
                requested: k,
            });
        }
        let distinct = count_distinct(&filtered, k);
        if distinct < k {
            return Err(ExtractionError::InsufficientData {
                available: distinct,
                requested: k,
            });
        }

        info!(
            "extracting {k} colors from {} of {total} pixels",
            filtered.len()
        );

        let results = self.cluster(&filtered, k);

        let empty = results.iter().filter(|r| r.pixel_count == 0).count();
        if empty > 0 {
            warn!("{empty} of {k} clusters received no pixels");
        }
        Ok(results)
    }

    /// Keep only pixels whose every channel lies strictly inside the bounds.
    pub fn filter(&self, pixels: Vec<[u8; 3]>) -> Vec<[u8; 3]> {
        if !self.config.filter_extremes {
            return pixels;
        }
        let (lo, hi) = (self.config.lower_bound, self.config.upper_bound);
        pixels
            .into_iter()
            .filter(|px| px.iter().all(|&c| c > lo && c < hi))
            .collect()
    }

    fn cluster(&self, pixels: &[[u8; 3]], k: usize) -> Vec<ColorResult> {
        let params = KmeansParams {
            k,
            n_init: self.config.n_init,
            max_iterations: self.config.max_iterations,
            tolerance: self.config.tolerance,
            seed: self.config.seed,
        };
        let points: Vec<Point> = pixels.iter().map(to_point).collect();

        let sample = match self.config.sample_limit {
            Some(limit) if pixels.len() > limit => {
                let sample = subsample(pixels, limit, self.config.seed);
                if count_distinct(&sample, k) < k {
                    warn!(
                        "{limit}-pixel sample holds fewer than {k} distinct colors; \
                         clustering all {} filtered pixels",
                        pixels.len()
                    );
                    None
                } else {
                    warn!(
                        "clustering a {limit}-pixel sample of {} filtered pixels",
                        pixels.len()
                    );
                    Some(sample)
                }
            }
            _ => None,
        };

        let Some(sample) = sample else {
            let fit = kmeans::fit(&points, &params);
            return rank(&fit.centroids, &fit.counts(), points.len());
        };

        let sample_points: Vec<Point> = sample.iter().map(to_point).collect();
        let fit = kmeans::fit(&sample_points, &params);

        // Coverage is measured on every filtered pixel, not just the sample.
        let mut counts = vec![0usize; k];
        for p in &points {
            counts[kmeans::nearest(p, &fit.centroids).0] += 1;
        }
        rank(&fit.centroids, &counts, points.len())
    }
}

/// Row-major pixel list; the grid is already 3-channel so alpha never appears.
pub fn flatten(image: &RgbImage) -> Vec<[u8; 3]> {
    image.pixels().map(|p| p.0).collect()
}

#[inline]
fn to_point(px: &[u8; 3]) -> Point {
    [px[0] as f64, px[1] as f64, px[2] as f64]
}

/// Distinct colors in `pixels`, counting no further than `limit`.
fn count_distinct(pixels: &[[u8; 3]], limit: usize) -> usize {
    let mut seen = HashSet::with_capacity(limit);
    for px in pixels {
        seen.insert(*px);
        if seen.len() >= limit {
            break;
        }
    }
    seen.len()
}

/// Seeded uniform sample without replacement, original order preserved.
fn subsample(pixels: &[[u8; 3]], amount: usize, seed: u64) -> Vec<[u8; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, pixels.len(), amount).into_vec();
    indices.sort_unstable();
    indices.into_iter().map(|i| pixels[i]).collect()
}

/// Pair centroids with coverage and sort by descending pixel count.
/// The sort is stable, so equal counts keep cluster index order.
fn rank(centroids: &[Point], counts: &[usize], total: usize) -> Vec<ColorResult> {
    let mut results: Vec<ColorResult> = centroids
        .iter()
        .zip(counts)
        .map(|(c, &count)| ColorResult {
            centroid: *c,
            coverage: 100.0 * count as f64 / total as f64,
            pixel_count: count,
        })
        .collect();
    results.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count));
    results
}
