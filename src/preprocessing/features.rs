//! Feature vector assembly
//!
//! [`feature_vector`] is the single definition of feature order. The batch
//! helpers apply it row by row so training and single-record prediction can
//! never diverge.

use super::encoder::CategoricalEncoders;
use crate::error::{ChurnError, Result};
use crate::synthetic::{CategoricalColumn, CustomerProfile, CustomerRecord, Dataset};
use ndarray::{Array1, Array2};

/// Width of the model input
pub const N_FEATURES: usize = 13;

/// Feature names in vector order
pub const FEATURE_COLUMNS: [&str; N_FEATURES] = [
    "age",
    "tenure_months",
    "monthly_charges",
    "total_charges",
    "num_services",
    "support_tickets",
    "satisfaction_score",
    "has_partner",
    "has_dependents",
    "gender_encoded",
    "contract_type_encoded",
    "payment_method_encoded",
    "online_activity_encoded",
];

/// Numeric feature matrix plus labels, before scaling
#[derive(Debug, Clone)]
pub struct EncodedFeatureSet {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

impl EncodedFeatureSet {
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    /// Rows at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Self {
        let x = Array2::from_shape_fn((indices.len(), self.x.ncols()), |(i, j)| {
            self.x[[indices[i], j]]
        });
        let y = indices.iter().map(|&i| self.y[i]).collect();
        Self { x, y }
    }
}

/// Encode one profile into its 13-dim feature vector
pub fn feature_vector(
    profile: &CustomerProfile,
    encoders: &CategoricalEncoders,
) -> Result<[f64; N_FEATURES]> {
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    let code = |column| encoders.encode(column, profile).map(|c| c as f64);

    Ok([
        profile.age as f64,
        profile.tenure_months as f64,
        profile.monthly_charges,
        profile.total_charges(),
        profile.num_services as f64,
        profile.support_tickets as f64,
        profile.satisfaction_score,
        flag(profile.has_partner),
        flag(profile.has_dependents),
        code(CategoricalColumn::Gender)?,
        code(CategoricalColumn::ContractType)?,
        code(CategoricalColumn::PaymentMethod)?,
        code(CategoricalColumn::OnlineActivity)?,
    ])
}

/// Encode a record; identical to encoding its profile
pub fn encode(record: &CustomerRecord, encoders: &CategoricalEncoders) -> Result<[f64; N_FEATURES]> {
    feature_vector(&record.profile, encoders)
}

/// Stack the feature vectors of `records` into a matrix
pub fn feature_matrix(records: &[CustomerRecord], encoders: &CategoricalEncoders) -> Result<Array2<f64>> {
    let mut flat = Vec::with_capacity(records.len() * N_FEATURES);
    for record in records {
        flat.extend_from_slice(&encode(record, encoders)?);
    }
    Array2::from_shape_vec((records.len(), N_FEATURES), flat)
        .map_err(|e| ChurnError::DataError(e.to_string()))
}

/// Fit encoders on `dataset` and encode every record with them
pub fn fit_encode(
    dataset: &Dataset,
    categorical_columns: &[CategoricalColumn],
) -> Result<(EncodedFeatureSet, CategoricalEncoders)> {
    let encoders = CategoricalEncoders::fit(dataset, categorical_columns);
    let x = feature_matrix(dataset.records(), &encoders)?;
    let y = dataset.labels();
    Ok((EncodedFeatureSet { x, y }, encoders))
}
