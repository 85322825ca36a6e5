//! ROC curves and area under the curve

use crate::error::{ChurnError, Result};
use crate::training::Classifier;
use crate::utils::safe_div;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// ROC curve of one model.
///
/// Points are ordered by decreasing threshold; the first point is (0, 0)
/// at an infinite threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
    pub auc: f64,
}

impl RocCurve {
    pub fn len(&self) -> usize {
        self.fpr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fpr.is_empty()
    }
}

/// Build the curve from positive-class scores, one point per distinct score
pub fn roc_curve(y_true: &Array1<f64>, scores: &Array1<f64>) -> Result<RocCurve> {
    if y_true.len() != scores.len() {
        return Err(ChurnError::dimension("scores", y_true.len(), scores.len()));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
    });

    let positives = y_true.iter().filter(|&&y| y >= 0.5).count() as f64;
    let negatives = y_true.len() as f64 - positives;

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];

    let mut tp = 0.0;
    let mut fp = 0.0;
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if y_true[order[i]] >= 0.5 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }
        fpr.push(safe_div(fp, negatives));
        tpr.push(safe_div(tp, positives));
        thresholds.push(threshold);
    }

    let auc = trapezoid_auc(&fpr, &tpr);
    Ok(RocCurve {
        fpr,
        tpr,
        thresholds,
        auc,
    })
}

/// Trapezoidal area under a piecewise-linear curve
pub fn trapezoid_auc(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

/// ROC curves for every model with probability output, in input order.
/// Models without probabilities are left out.
pub fn roc<'a, I>(
    models: I,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
) -> Result<Vec<(String, RocCurve)>>
where
    I: IntoIterator<Item = (&'a str, &'a dyn Classifier)>,
{
    if x_test.nrows() != y_test.len() {
        return Err(ChurnError::dimension("rows", x_test.nrows(), y_test.len()));
    }

    let mut curves = Vec::new();
    for (name, model) in models {
        match model.predict_proba(x_test)? {
            Some(scores) => curves.push((name.to_string(), roc_curve(y_test, &scores)?)),
            None => debug!(model = name, "No probability output, ROC skipped"),
        }
    }
    Ok(curves)
}
