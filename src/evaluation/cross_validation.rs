//! Cross-validated F1 scores

use super::metrics::ClassificationMetrics;
use crate::error::{ChurnError, Result};
use crate::training::{fixed_specs, CVSplit, Classifier, CrossValidator, ModelSpec};
use crate::utils::{mean, population_std};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// F1 across the folds of one model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationSummary {
    pub model: String,
    pub fold_scores: Vec<f64>,
    pub mean: f64,
    /// Population standard deviation of the fold scores
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub n_folds: usize,
}

impl CrossValidationSummary {
    fn from_scores(model: String, fold_scores: Vec<f64>) -> Self {
        let min = fold_scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = fold_scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            mean: mean(&fold_scores),
            std: population_std(&fold_scores),
            min,
            max,
            n_folds: fold_scores.len(),
            model,
            fold_scores,
        }
    }
}

/// Stratified, unshuffled fold assignment shared by every model of a report
pub fn stratified_folds(y: &Array1<f64>, folds: usize) -> Result<Vec<CVSplit>> {
    CrossValidator::new(folds).split(y)
}

fn score_splits(
    spec: &ModelSpec,
    x: &Array2<f64>,
    y: &Array1<f64>,
    splits: &[CVSplit],
) -> Result<CrossValidationSummary> {
    let scores = splits
        .par_iter()
        .map(|split| {
            let x_train = x.select(Axis(0), &split.train_indices);
            let y_train = y.select(Axis(0), &split.train_indices);
            let x_test = x.select(Axis(0), &split.test_indices);
            let y_test = y.select(Axis(0), &split.test_indices);

            let model = spec.fit(&x_train, &y_train)?;
            let y_pred = model.predict(&x_test)?;
            let f1 = ClassificationMetrics::compute(&y_test, &y_pred)?.f1;
            debug!(model = %spec.name(), fold = split.fold_idx, f1, "Fold scored");
            Ok(f1)
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(CrossValidationSummary::from_scores(spec.name(), scores))
}

fn check_inputs(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(ChurnError::dimension("rows", x.nrows(), y.len()));
    }
    Ok(())
}

/// Cross-validate one configuration on the full scaled matrix.
///
/// The seed of a logistic regression lives in its `ModelSpec`.
pub fn cross_validate(
    spec: &ModelSpec,
    x: &Array2<f64>,
    y: &Array1<f64>,
    folds: usize,
) -> Result<CrossValidationSummary> {
    check_inputs(x, y)?;
    let splits = stratified_folds(y, folds)?;
    score_splits(spec, x, y, &splits)
}

/// Cross-validate every fixed configuration, seeded with `seed`, over one
/// shared fold list
pub fn cross_validate_all(
    x: &Array2<f64>,
    y: &Array1<f64>,
    folds: usize,
    seed: u64,
) -> Result<Vec<CrossValidationSummary>> {
    check_inputs(x, y)?;
    let splits = stratified_folds(y, folds)?;
    fixed_specs(seed)
        .iter()
        .map(|spec| score_splits(spec, x, y, &splits))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_data() -> (Array2<f64>, Array1<f64>) {
        let n = 60;
        let y = Array1::from_shape_fn(n, |i| if i % 3 == 0 { 1.0 } else { 0.0 });
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            let signal = if i % 3 == 0 { 1.0 } else { -1.0 };
            signal + ((i * 7 + j * 13) as f64).sin()
        });
        (x, y)
    }

    #[test]
    fn test_summary_bounds() {
        let (x, y) = noisy_data();
        let spec = ModelSpec::Knn { k: 5 };
        let summary = cross_validate(&spec, &x, &y, 5).unwrap();

        assert_eq!(summary.n_folds, 5);
        assert_eq!(summary.fold_scores.len(), 5);
        assert!(summary.min <= summary.mean && summary.mean <= summary.max);
        assert!(summary.std >= 0.0);
        assert_eq!(summary.model, "KNN (k=5)");
    }

    #[test]
    fn test_all_models_reproducible() {
        let (x, y) = noisy_data();
        let a = cross_validate_all(&x, &y, 3, 42).unwrap();
        let b = cross_validate_all(&x, &y, 3, 42).unwrap();

        assert_eq!(a.len(), 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_summary_statistics() {
        let summary =
            CrossValidationSummary::from_scores("m".to_string(), vec![0.5, 0.7, 0.9]);
        assert!((summary.mean - 0.7).abs() < 1e-12);
        assert!((summary.std - (0.08f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(summary.min, 0.5);
        assert_eq!(summary.max, 0.9);
    }

    #[test]
    fn test_row_mismatch() {
        let (x, _) = noisy_data();
        let y = Array1::zeros(10);
        assert!(matches!(
            cross_validate(&ModelSpec::Knn { k: 5 }, &x, &y, 5),
            Err(ChurnError::DimensionMismatch { .. })
        ));
    }
}
