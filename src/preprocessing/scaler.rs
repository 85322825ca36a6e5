//! Feature standardization

use crate::error::{ChurnError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Z-score scaler: `(x - mean) / std` per column.
///
/// Statistics are computed once by [`StandardScaler::fit`] and reapplied
/// unchanged by every transform. The standard deviation is the population
/// one; a constant column gets a scale of 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    center: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fit column statistics on `x`
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(ChurnError::DegenerateFit(format!(
                "cannot fit scaler on a {}x{} matrix",
                x.nrows(),
                x.ncols()
            )));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ChurnError::DegenerateFit(
                "scaler input contains non-finite values".to_string(),
            ));
        }

        let center = x
            .mean_axis(Axis(0))
            .ok_or_else(|| ChurnError::DegenerateFit("empty scaler input".to_string()))?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s == 0.0 { 1.0 } else { s });

        Ok(Self { center, scale })
    }

    /// Fit on `x` and return the scaled copy
    pub fn fit_transform(x: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(x)?;
        let scaled = scaler.transform(x)?;
        Ok((scaler, scaled))
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(x.ncols())?;
        Ok((x - &self.center.view().insert_axis(Axis(0))) / &self.scale.view().insert_axis(Axis(0)))
    }

    /// Scale a single feature row
    pub fn transform_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>> {
        self.check_width(row.len())?;
        Ok((&row - &self.center) / &self.scale)
    }

    pub fn n_features(&self) -> usize {
        self.center.len()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.center
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.n_features() {
            return Err(ChurnError::dimension("n_features", self.n_features(), width));
        }
        Ok(())
    }
}
