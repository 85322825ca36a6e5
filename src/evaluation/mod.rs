//! Model evaluation
//!
//! Test-set metrics, confusion matrices, ROC curves and cross-validated F1
//! for the fitted model set.

mod cross_validation;
mod metrics;
mod report;
mod roc;

pub use cross_validation::{
    cross_validate, cross_validate_all, stratified_folds, CrossValidationSummary,
};
pub use metrics::{confusion, evaluate, ClassificationMetrics, ConfusionMatrix};
pub use report::{EvaluationReport, ModelEvaluation};
pub use roc::{roc, roc_curve, trapezoid_auc, RocCurve};
