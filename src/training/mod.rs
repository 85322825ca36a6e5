//! Model training module
//!
//! Fits the fixed set of churn classifiers on scaled features:
//! - Logistic regression (seeded gradient descent)
//! - K-Nearest Neighbors with k = 5 and k = 11
//! - Stratified k-fold splitting for cross-validation

mod engine;
mod models;
pub mod cross_validation;
pub mod knn;
pub mod linear_models;

pub use cross_validation::{CVSplit, CrossValidator};
pub use engine::{
    fixed_specs, train, ModelSet, ModelSpec, TrainedModel, KNN_11, KNN_5, LOGISTIC_REGRESSION,
};
pub use knn::KNNClassifier;
pub use linear_models::LogisticRegression;
pub use models::Classifier;
