//! Classification metrics and confusion matrices

use crate::error::{ChurnError, Result};
use crate::training::{Classifier, ModelSet};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Test-set metrics for one model, positive class = churn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ClassificationMetrics {
    /// Compute classification metrics. Zero denominators give 0.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        let cm = ConfusionMatrix::compute(y_true, y_pred)?;
        Ok(Self::from_confusion(&cm))
    }

    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let (tp, fp, tn, fn_) = (
            cm.true_positives() as f64,
            cm.false_positives() as f64,
            cm.true_negatives() as f64,
            cm.false_negatives() as f64,
        );
        let total = tp + fp + tn + fn_;

        let accuracy = if total > 0.0 { (tp + tn) / total } else { 0.0 };
        let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
        let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            accuracy,
            precision,
            recall,
            f1,
        }
    }
}

/// 2×2 confusion matrix `[[TN, FP], [FN, TP]]`, rows = actual, columns =
/// predicted, label order [fidèle (0), churn (1)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub cells: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(ChurnError::dimension("labels", y_true.len(), y_pred.len()));
        }

        let mut cells = [[0usize; 2]; 2];
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            let actual = usize::from(t >= 0.5);
            let predicted = usize::from(p >= 0.5);
            cells[actual][predicted] += 1;
        }
        Ok(Self { cells })
    }

    pub fn true_negatives(&self) -> usize {
        self.cells[0][0]
    }

    pub fn false_positives(&self) -> usize {
        self.cells[0][1]
    }

    pub fn false_negatives(&self) -> usize {
        self.cells[1][0]
    }

    pub fn true_positives(&self) -> usize {
        self.cells[1][1]
    }

    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }

    pub fn to_array(&self) -> Array2<usize> {
        Array2::from_shape_fn((2, 2), |(i, j)| self.cells[i][j])
    }
}

fn check_rows(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(ChurnError::dimension("rows", x.nrows(), y.len()));
    }
    Ok(())
}

/// Per-model test metrics, in model-set order
pub fn evaluate(
    models: &ModelSet,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
) -> Result<Vec<(String, ClassificationMetrics)>> {
    check_rows(x_test, y_test)?;
    models
        .iter()
        .map(|(name, model)| {
            let y_pred = model.predict(x_test)?;
            Ok((name.to_string(), ClassificationMetrics::compute(y_test, &y_pred)?))
        })
        .collect()
}

/// Confusion matrix of one model on the test set
pub fn confusion<M: Classifier + ?Sized>(
    model: &M,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
) -> Result<ConfusionMatrix> {
    check_rows(x_test, y_test)?;
    let y_pred = model.predict(x_test)?;
    ConfusionMatrix::compute(y_test, &y_pred)
}
