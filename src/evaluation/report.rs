//! Evaluation report gathering every metric of one run

use super::cross_validation::CrossValidationSummary;
use super::metrics::{ClassificationMetrics, ConfusionMatrix};
use super::roc::RocCurve;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Per-model row of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub model: String,
    pub metrics: ClassificationMetrics,
    pub confusion: ConfusionMatrix,
    /// `None` for models without probability output
    pub roc: Option<RocCurve>,
}

impl ModelEvaluation {
    pub fn auc(&self) -> Option<f64> {
        self.roc.as_ref().map(|r| r.auc)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub n_train: usize,
    pub n_test: usize,
    pub seed: u64,
    pub models: Vec<ModelEvaluation>,
    pub cross_validation: Vec<CrossValidationSummary>,
    /// `(feature, importance)` for the logistic regression, largest first
    pub feature_importances: Vec<(String, f64)>,
}

impl EvaluationReport {
    /// Model with the highest test F1
    pub fn best_model(&self) -> Option<&ModelEvaluation> {
        self.models.iter().max_by(|a, b| {
            a.metrics
                .f1
                .partial_cmp(&b.metrics.f1)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Generate a text report
    pub fn render(&self) -> String {
        let mut report = String::new();
        report.push_str("=== ChurnGuard Evaluation Report ===\n\n");

        report.push_str("--- Data Shape ---\n");
        report.push_str(&format!("Train: {}\n", self.n_train));
        report.push_str(&format!("Test:  {}\n", self.n_test));
        report.push_str(&format!("Seed:  {}\n\n", self.seed));

        report.push_str("--- Metrics Summary ---\n");
        report.push_str(&format!(
            "  {:<24} {:>9} {:>9} {:>9} {:>9} {:>9}\n",
            "Modèle", "Accuracy", "Precision", "Recall", "F1", "AUC"
        ));
        for eval in &self.models {
            let auc = eval
                .auc()
                .map(|v| format!("{:.4}", v))
                .unwrap_or_else(|| "-".to_string());
            report.push_str(&format!(
                "  {:<24} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9}\n",
                eval.model,
                eval.metrics.accuracy,
                eval.metrics.precision,
                eval.metrics.recall,
                eval.metrics.f1,
                auc
            ));
        }
        report.push('\n');

        report.push_str("--- Confusion Matrices (rows = actual, cols = predicted) ---\n");
        for eval in &self.models {
            let [[tn, fp], [fn_, tp]] = eval.confusion.cells;
            report.push_str(&format!("  {}\n", eval.model));
            report.push_str(&format!("    {:<8} {:>7} {:>7}\n", "", "Fidèle", "Churn"));
            report.push_str(&format!("    {:<8} {:>7} {:>7}\n", "Fidèle", tn, fp));
            report.push_str(&format!("    {:<8} {:>7} {:>7}\n", "Churn", fn_, tp));
        }
        report.push('\n');

        if !self.cross_validation.is_empty() {
            report.push_str("--- Cross-Validation (F1) ---\n");
            for cv in &self.cross_validation {
                report.push_str(&format!(
                    "  {:<24} mean {:.4}  std {:.4}  min {:.4}  max {:.4}  ({} folds)\n",
                    cv.model, cv.mean, cv.std, cv.min, cv.max, cv.n_folds
                ));
            }
            report.push('\n');
        }

        if !self.feature_importances.is_empty() {
            report.push_str("--- Feature Importance ---\n");
            for (name, imp) in &self.feature_importances {
                report.push_str(&format!("  {:<20} {:.4}\n", name, imp));
            }
        }

        report
    }
}
