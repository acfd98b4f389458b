//! Lloyd's k-means over RGB points with greedy k-means++ seeding.
//!
//! All randomness comes from one `StdRng` seeded by the caller, and every
//! reduction runs in point order, so a given (points, params) pair always
//! produces bit-identical centroids.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub type Point = [f64; 3];

#[derive(Clone, Copy, Debug)]
pub struct KmeansParams {
    pub k: usize,
    pub n_init: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub seed: u64,
}

/// Best clustering found across all restarts.
#[derive(Clone, Debug)]
pub struct KmeansFit {
    pub centroids: Vec<Point>,
    /// Cluster index of every input point
    pub labels: Vec<usize>,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
    pub iterations: usize,
}

impl KmeansFit {
    /// Number of points assigned to each cluster
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.centroids.len()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }
}

#[inline(always)]
pub fn squared_distance(a: &Point, b: &Point) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

/// Index of the closest centroid and its squared distance.
/// On equal distances the lower index wins.
#[inline]
pub fn nearest(point: &Point, centroids: &[Point]) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best_dist = squared_distance(point, &centroids[0]);
    for (idx, c) in centroids.iter().enumerate().skip(1) {
        let d = squared_distance(point, c);
        if d < best_dist {
            best_dist = d;
            best_idx = idx;
        }
    }
    (best_idx, best_dist)
}

/// Run `n_init` seeded restarts and keep the lowest-inertia result.
///
/// `points` must hold at least `params.k` entries and `params.k` must be
/// positive; the extractor checks both before calling.
pub fn fit(points: &[Point], params: &KmeansParams) -> KmeansFit {
    debug_assert!(params.k >= 1 && points.len() >= params.k);

    let mut rng = StdRng::seed_from_u64(params.seed);
    let tol = params.tolerance * mean_channel_variance(points);

    let mut best = run_once(points, params, tol, &mut rng);
    debug!(
        "k-means attempt 1/{}: inertia {:.3} after {} iterations",
        params.n_init, best.inertia, best.iterations
    );

    for attempt in 1..params.n_init {
        let run = run_once(points, params, tol, &mut rng);
        debug!(
            "k-means attempt {}/{}: inertia {:.3} after {} iterations",
            attempt + 1,
            params.n_init,
            run.inertia,
            run.iterations
        );
        // Strict comparison: the earlier attempt wins a tie.
        if run.inertia < best.inertia {
            best = run;
        }
    }

    best
}

fn run_once(points: &[Point], params: &KmeansParams, tol: f64, rng: &mut StdRng) -> KmeansFit {
    let centroids = init_plus_plus(points, params.k, rng);
    lloyd(points, centroids, params.max_iterations, tol)
}

// ------------------------------------------------------------
// Seeding
// ------------------------------------------------------------

/// Greedy k-means++: each new center is the best of a few D²-weighted
/// candidates, judged by the resulting potential.
fn init_plus_plus(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let n = points.len();
    let n_local_trials = 2 + (k as f64).ln().floor() as usize;

    let mut centroids = Vec::with_capacity(k);
    let first = points[rng.random_range(0..n)];
    centroids.push(first);

    let mut closest: Vec<f64> = points.iter().map(|p| squared_distance(p, &first)).collect();

    while centroids.len() < k {
        let potential: f64 = closest.iter().sum();

        let mut best_candidate = 0usize;
        let mut best_potential = f64::INFINITY;
        let mut best_closest: Vec<f64> = Vec::new();

        for _ in 0..n_local_trials {
            let candidate = if potential > 0.0 {
                sample_weighted(&closest, rng.random::<f64>() * potential)
            } else {
                // Every point coincides with a center already.
                rng.random_range(0..n)
            };

            let trial_closest: Vec<f64> = closest
                .iter()
                .zip(points)
                .map(|(&d, p)| d.min(squared_distance(p, &points[candidate])))
                .collect();
            let trial_potential: f64 = trial_closest.iter().sum();

            if trial_potential < best_potential {
                best_potential = trial_potential;
                best_candidate = candidate;
                best_closest = trial_closest;
            }
        }

        centroids.push(points[best_candidate]);
        closest = best_closest;
    }

    centroids
}

/// Index whose cumulative weight first exceeds `target`.
fn sample_weighted(weights: &[f64], target: f64) -> usize {
    let mut acc = 0.0;
    for (idx, &w) in weights.iter().enumerate() {
        acc += w;
        if acc > target {
            return idx;
        }
    }
    // Rounding left `target` at or past the total; take the last weighted point.
    weights
        .iter()
        .rposition(|&w| w > 0.0)
        .unwrap_or(weights.len() - 1)
}

// ------------------------------------------------------------
// Lloyd iterations
// ------------------------------------------------------------

fn lloyd(points: &[Point], mut centroids: Vec<Point>, max_iterations: usize, tol: f64) -> KmeansFit {
    let mut labels = vec![usize::MAX; points.len()];
    let mut iterations = 0;

    for _ in 0..max_iterations {
        iterations += 1;
        let changed = assign(points, &centroids, &mut labels);
        if changed == 0 {
            break;
        }
        let shift = update(points, &labels, &mut centroids);
        if shift <= tol {
            break;
        }
    }

    // Labels must reflect the final centroids.
    assign(points, &centroids, &mut labels);
    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(p, &l)| squared_distance(p, &centroids[l]))
        .sum();

    KmeansFit {
        centroids,
        labels,
        inertia,
        iterations,
    }
}

/// Relabel every point; returns how many labels changed.
fn assign(points: &[Point], centroids: &[Point], labels: &mut [usize]) -> usize {
    let mut changed = 0;
    for (p, label) in points.iter().zip(labels.iter_mut()) {
        let (idx, _) = nearest(p, centroids);
        if *label != idx {
            *label = idx;
            changed += 1;
        }
    }
    changed
}

/// Move each centroid to the mean of its points; an empty cluster keeps its
/// previous position. Returns the summed squared centroid shift.
fn update(points: &[Point], labels: &[usize], centroids: &mut [Point]) -> f64 {
    let k = centroids.len();
    let mut sums = vec![[0.0f64; 3]; k];
    let mut counts = vec![0usize; k];

    for (p, &l) in points.iter().zip(labels) {
        sums[l][0] += p[0];
        sums[l][1] += p[1];
        sums[l][2] += p[2];
        counts[l] += 1;
    }

    let mut shift = 0.0;
    for ((c, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
        if count == 0 {
            continue;
        }
        let n = count as f64;
        let moved = [sum[0] / n, sum[1] / n, sum[2] / n];
        shift += squared_distance(c, &moved);
        *c = moved;
    }
    shift
}

fn mean_channel_variance(points: &[Point]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let n = points.len() as f64;
    let mut mean = [0.0f64; 3];
    for p in points {
        for (m, v) in mean.iter_mut().zip(p) {
            *m += v;
        }
    }
    for m in mean.iter_mut() {
        *m /= n;
    }
    let var: f64 = points
        .iter()
        .map(|p| squared_distance(p, &mean))
        .sum();
    var / (n * 3.0)
}
