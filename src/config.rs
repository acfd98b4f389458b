//! Tunable parameters for dominant color extraction.
//!
//! Defaults reproduce the classic behavior: pixels with any channel at or
//! below 20 or at or above 235 are dropped, k-means is restarted 10 times
//! from seed 42, and the best (lowest inertia) run is kept.
//!
//! ```no_run
//! use dominant_colors_wasm::ExtractorConfig;
//! use std::path::Path;
//!
//! let config = ExtractorConfig::from_json_file(Path::new("extractor.json"))?;
//! config.validate()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, Result};

/// Pixels need every channel strictly above this value to be clustered.
pub const LOWER_CHANNEL_BOUND: u8 = 20;

/// Pixels need every channel strictly below this value to be clustered.
pub const UPPER_CHANNEL_BOUND: u8 = 235;

/// Minimum number of independent k-means initializations.
pub const MIN_INIT_ATTEMPTS: usize = 10;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

pub const DEFAULT_MAX_ITERATIONS: usize = 300;

/// Relative convergence tolerance, scaled by the mean channel variance.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Exclusive lower channel bound of the extremes filter
    pub lower_bound: u8,

    /// Exclusive upper channel bound of the extremes filter
    pub upper_bound: u8,

    /// Drop near-black and near-white pixels before clustering
    pub filter_extremes: bool,

    /// Number of k-means restarts (at least `MIN_INIT_ATTEMPTS`)
    pub n_init: usize,

    /// Lloyd iteration cap per restart
    pub max_iterations: usize,

    pub tolerance: f64,

    pub seed: u64,

    /// Cluster a seeded random subsample of at most this many pixels.
    /// Coverage is still measured over every filtered pixel.
    pub sample_limit: Option<usize>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            lower_bound: LOWER_CHANNEL_BOUND,
            upper_bound: UPPER_CHANNEL_BOUND,
            filter_extremes: true,
            n_init: MIN_INIT_ATTEMPTS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            seed: DEFAULT_SEED,
            sample_limit: None,
        }
    }
}

impl ExtractorConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sample_limit(mut self, limit: Option<usize>) -> Self {
        self.sample_limit = limit;
        self
    }

    pub fn unfiltered(mut self) -> Self {
        self.filter_extremes = false;
        self
    }

    /// Check that the parameters describe a runnable extraction
    pub fn validate(&self) -> Result<()> {
        if self.lower_bound >= self.upper_bound {
            return Err(ExtractionError::invalid_input(format!(
                "lower_bound ({}) must be below upper_bound ({})",
                self.lower_bound, self.upper_bound
            )));
        }
        if self.n_init < MIN_INIT_ATTEMPTS {
            return Err(ExtractionError::invalid_input(format!(
                "n_init must be at least {MIN_INIT_ATTEMPTS}, got {}",
                self.n_init
            )));
        }
        if self.max_iterations == 0 {
            return Err(ExtractionError::invalid_input("max_iterations must be positive"));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ExtractionError::invalid_input(format!(
                "tolerance must be a finite non-negative number, got {}",
                self.tolerance
            )));
        }
        if self.sample_limit == Some(0) {
            return Err(ExtractionError::invalid_input("sample_limit must be positive"));
        }
        Ok(())
    }

    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExtractionError::config(format!("reading {}", path.display()), e))?;
        serde_json::from_str(&content)
            .map_err(|e| ExtractionError::config(format!("parsing {}", path.display()), e))
    }

    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ExtractionError::config("serializing configuration", e))?;
        std::fs::write(path, json)
            .map_err(|e| ExtractionError::config(format!("writing {}", path.display()), e))
    }
}
