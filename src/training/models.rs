//! Classifier trait and shared input checks

use crate::error::{ChurnError, Result};
use ndarray::{Array1, Array2};

/// A fitted binary classifier over scaled feature rows.
///
/// Labels are 0.0 (fidèle) and 1.0 (churn).
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// Width of the rows the model was fitted on
    fn n_features(&self) -> usize;

    /// Predict class labels
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Positive-class probability per row, `None` if the model has no
    /// probability output
    fn predict_proba(&self, _x: &Array2<f64>) -> Result<Option<Array1<f64>>> {
        Ok(None)
    }

    /// Per-feature importance, if the model defines one
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}

/// Reject prediction input whose width differs from the fitted width
pub(crate) fn check_prediction_input(x: &Array2<f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(ChurnError::dimension("n_features", n_features, x.ncols()));
    }
    Ok(())
}

/// Validate a training matrix and its 0/1 labels
pub(crate) fn check_training_input(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(ChurnError::dimension("y length", x.nrows(), y.len()));
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ChurnError::DegenerateFit(format!(
            "empty training matrix ({}x{})",
            x.nrows(),
            x.ncols()
        )));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(ChurnError::DegenerateFit(
            "training matrix contains non-finite values".to_string(),
        ));
    }
    if y.iter().any(|&v| v != 0.0 && v != 1.0) {
        return Err(ChurnError::DegenerateFit(
            "labels must be 0 or 1".to_string(),
        ));
    }
    Ok(())
}
