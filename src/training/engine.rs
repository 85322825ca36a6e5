//! Training engine: the fixed model configurations and the fitted model set

use super::knn::KNNClassifier;
use super::linear_models::LogisticRegression;
use super::models::Classifier;
use crate::error::{ChurnError, Result};
use crate::utils::Timer;
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const LOGISTIC_REGRESSION: &str = "Régression Logistique";
pub const KNN_5: &str = "KNN (k=5)";
pub const KNN_11: &str = "KNN (k=11)";

/// Unfitted model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelSpec {
    LogisticRegression { random_state: u64, max_iter: usize },
    Knn { k: usize },
}

impl ModelSpec {
    /// Display name used in every report
    pub fn name(&self) -> String {
        match self {
            ModelSpec::LogisticRegression { .. } => LOGISTIC_REGRESSION.to_string(),
            ModelSpec::Knn { k } => format!("KNN (k={})", k),
        }
    }

    /// Fit a fresh model of this configuration
    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<TrainedModel> {
        match self {
            ModelSpec::LogisticRegression {
                random_state,
                max_iter,
            } => {
                let mut model = LogisticRegression::new()
                    .with_random_state(*random_state)
                    .with_max_iter(*max_iter);
                model.fit(x, y)?;
                Ok(TrainedModel::LogisticRegression(model))
            }
            ModelSpec::Knn { k } => {
                let mut model = KNNClassifier::new(*k)?;
                model.fit(x, y)?;
                Ok(TrainedModel::KNNClassifier(model))
            }
        }
    }
}

/// The three configurations every run trains, in report order
pub fn fixed_specs(seed: u64) -> Vec<ModelSpec> {
    vec![
        ModelSpec::LogisticRegression {
            random_state: seed,
            max_iter: 1000,
        },
        ModelSpec::Knn { k: 5 },
        ModelSpec::Knn { k: 11 },
    ]
}

/// Enum to hold trained model variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    LogisticRegression(LogisticRegression),
    KNNClassifier(KNNClassifier),
}

impl TrainedModel {
    fn inner(&self) -> &dyn Classifier {
        match self {
            TrainedModel::LogisticRegression(m) => m,
            TrainedModel::KNNClassifier(m) => m,
        }
    }
}

impl Classifier for TrainedModel {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.inner().predict(x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Option<Array1<f64>>> {
        self.inner().predict_proba(x)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.inner().feature_importances()
    }
}

/// Ordered name → fitted model mapping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSet {
    models: Vec<(String, TrainedModel)>,
}

impl ModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a model, keeping first-insertion order
    pub fn insert(&mut self, name: impl Into<String>, model: TrainedModel) {
        let name = name.into();
        match self.models.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = model,
            None => self.models.push((name, model)),
        }
    }

    pub fn get(&self, name: &str) -> Result<&TrainedModel> {
        self.models
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m)
            .ok_or_else(|| ChurnError::ModelNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrainedModel)> {
        self.models.iter().map(|(n, m)| (n.as_str(), m))
    }

    /// Models as trait objects, for evaluators that accept any classifier
    pub fn classifiers(&self) -> impl Iterator<Item = (&str, &dyn Classifier)> {
        self.models
            .iter()
            .map(|(n, m)| (n.as_str(), m as &dyn Classifier))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Fit every fixed configuration on the same scaled training matrix.
///
/// Models are independent, so they are fitted in parallel; the returned set
/// keeps the fixed order.
pub fn train(x_train: &Array2<f64>, y_train: &Array1<f64>, seed: u64) -> Result<ModelSet> {
    let timer = Timer::start();
    let specs = fixed_specs(seed);

    let fitted: Vec<(String, TrainedModel)> = specs
        .par_iter()
        .map(|spec| spec.fit(x_train, y_train).map(|model| (spec.name(), model)))
        .collect::<Result<Vec<_>>>()?;

    let mut models = ModelSet::new();
    for (name, model) in fitted {
        models.insert(name, model);
    }

    info!(
        n_models = models.len(),
        n_samples = x_train.nrows(),
        n_features = x_train.ncols(),
        elapsed_ms = timer.elapsed_ms(),
        "Models trained"
    );
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| {
            let base = if i < 20 { -2.0 } else { 2.0 };
            base + (i as f64 * 0.37 + j as f64 * 0.11).sin() * 0.5
        });
        let y = Array1::from_shape_fn(40, |i| if i < 20 { 0.0 } else { 1.0 });
        (x, y)
    }

    #[test]
    fn test_train_fixed_order() {
        let (x, y) = separable_data();
        let models = train(&x, &y, 42).unwrap();
        assert_eq!(models.names(), vec![LOGISTIC_REGRESSION, KNN_5, KNN_11]);

        for (_, model) in models.iter() {
            assert_eq!(model.n_features(), 2);
            assert_eq!(model.predict(&x).unwrap(), y);
        }
    }

    #[test]
    fn test_model_lookup() {
        let (x, y) = separable_data();
        let models = train(&x, &y, 7).unwrap();
        assert!(models.get(KNN_5).is_ok());
        assert!(matches!(
            models.get("Random Forest"),
            Err(ChurnError::ModelNotFound(_))
        ));
        assert!(models.get(LOGISTIC_REGRESSION).unwrap().feature_importances().is_some());
        assert!(models.get(KNN_11).unwrap().feature_importances().is_none());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let (x, y) = separable_data();
        let mut models = train(&x, &y, 1).unwrap();
        let knn = ModelSpec::Knn { k: 3 }.fit(&x, &y).unwrap();
        models.insert(KNN_5, knn);
        assert_eq!(models.len(), 3);
        assert_eq!(models.names()[1], KNN_5);
    }

    #[test]
    fn test_train_propagates_fit_failure() {
        let x = Array2::zeros((8, 2));
        let y = Array1::zeros(8);
        assert!(matches!(train(&x, &y, 42), Err(ChurnError::DegenerateFit(_))));
    }
}
