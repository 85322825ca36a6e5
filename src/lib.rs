//! ChurnGuard - customer churn analytics engine
//!
//! Synthesizes a customer dataset, summarizes churn patterns, trains a fixed
//! set of classifiers, evaluates them and scores individual customers.
//!
//! # Modules
//!
//! ## Pipeline stages
//! - [`synthetic`] - Deterministic synthetic customer data
//! - [`preprocessing`] - Label encoding, feature vectors, split, scaling
//! - [`training`] - Logistic regression and KNN classifiers
//! - [`evaluation`] - Metrics, ROC/AUC, confusion matrices, cross-validation
//! - [`inference`] - Single-customer scoring with risk flags
//!
//! ## Orchestration
//! - [`pipeline`] - One fitted end-to-end run
//! - [`cache`] - Memoized datasets and pipelines
//! - [`analysis`] - Descriptive dataset statistics
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod config;

// Pipeline stages
pub mod synthetic;
pub mod preprocessing;
pub mod training;
pub mod evaluation;
pub mod inference;

// Orchestration
pub mod pipeline;
pub mod cache;
pub mod analysis;

// Interfaces
pub mod cli;

// Utilities
pub mod utils;

pub use error::{ChurnError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cache::PipelineCache;
    pub use crate::config::PipelineConfig;
    pub use crate::error::{ChurnError, Result};
    pub use crate::evaluation::{ClassificationMetrics, ConfusionMatrix, EvaluationReport, RocCurve};
    pub use crate::inference::{predict_one, Prediction, RiskFlag, RiskLevel};
    pub use crate::pipeline::ChurnPipeline;
    pub use crate::preprocessing::{CategoricalEncoders, StandardScaler};
    pub use crate::synthetic::{generate, CustomerProfile, CustomerRecord, Dataset};
    pub use crate::training::{Classifier, ModelSet, TrainedModel};
}
