//! Pipeline configuration

use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of generated customers
pub const DEFAULT_N_SAMPLES: usize = 5000;
/// Default seed shared by generation, splitting and model initialisation
pub const DEFAULT_SEED: u64 = 42;
/// Default held-out share
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
/// Default number of cross-validation folds
pub const DEFAULT_CV_FOLDS: usize = 5;

/// Configuration for one end-to-end pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of synthetic customers to generate
    pub n_samples: usize,

    /// Random seed for generation, train/test split and model initialisation
    pub seed: u64,

    /// Fraction of the dataset held out for evaluation
    pub test_size: f64,

    /// Number of folds for cross-validation
    pub cv_folds: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            n_samples: DEFAULT_N_SAMPLES,
            seed: DEFAULT_SEED,
            test_size: DEFAULT_TEST_SIZE,
            cv_folds: DEFAULT_CV_FOLDS,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_cv_folds(mut self, cv_folds: usize) -> Self {
        self.cv_folds = cv_folds;
        self
    }

    /// Load a configuration from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration describes a runnable pipeline
    pub fn validate(&self) -> Result<()> {
        if self.n_samples == 0 {
            return Err(ChurnError::InvalidParameter {
                name: "n_samples".to_string(),
                value: self.n_samples.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ChurnError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must lie strictly between 0 and 1".to_string(),
            });
        }
        if self.cv_folds < 2 {
            return Err(ChurnError::InvalidParameter {
                name: "cv_folds".to_string(),
                value: self.cv_folds.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        Ok(())
    }
}
