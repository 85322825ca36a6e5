//! End-to-end churn pipeline
//!
//! One fitted run: dataset, encoders, split, scaler and the fixed model set.
//! Everything is computed in [`ChurnPipeline::fit`] and read-only afterwards.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::evaluation::{
    self, ClassificationMetrics, ConfusionMatrix, CrossValidationSummary, EvaluationReport,
    ModelEvaluation, RocCurve,
};
use crate::inference::{predict_one, Prediction};
use crate::preprocessing::{
    fit_encode, train_test_split, CategoricalEncoders, StandardScaler, TrainTestSplit,
    FEATURE_COLUMNS,
};
use crate::synthetic::{generate, CategoricalColumn, CustomerProfile, Dataset};
use crate::training::{self, fixed_specs, Classifier, ModelSet, LOGISTIC_REGRESSION};
use crate::utils::Timer;
use ndarray::{Array1, Array2, Axis};
use std::sync::Arc;
use tracing::info;

/// A fitted pipeline run
#[derive(Debug)]
pub struct ChurnPipeline {
    config: PipelineConfig,
    dataset: Arc<Dataset>,
    encoders: CategoricalEncoders,
    split: TrainTestSplit,
    scaler: StandardScaler,
    /// Every row, scaled with the training statistics
    x_scaled: Array2<f64>,
    y: Array1<f64>,
    x_train: Array2<f64>,
    y_train: Array1<f64>,
    x_test: Array2<f64>,
    y_test: Array1<f64>,
    models: ModelSet,
}

impl ChurnPipeline {
    /// Generate the dataset described by `config` and fit on it
    pub fn fit(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let dataset = Arc::new(generate(config.n_samples, config.seed)?);
        Self::fit_dataset(dataset, config)
    }

    /// Fit on an existing dataset; `config.n_samples` is ignored
    pub fn fit_dataset(dataset: Arc<Dataset>, config: &PipelineConfig) -> Result<Self> {
        let timer = Timer::start();
        config.validate()?;

        let (features, encoders) = fit_encode(&dataset, &CategoricalColumn::ALL)?;
        let split = train_test_split(features.n_samples(), config.test_size, config.seed)?;

        let x_train_raw = features.x.select(Axis(0), &split.train_indices);
        let (scaler, x_train) = StandardScaler::fit_transform(&x_train_raw)?;
        let y_train = features.y.select(Axis(0), &split.train_indices);

        let x_scaled = scaler.transform(&features.x)?;
        let x_test = x_scaled.select(Axis(0), &split.test_indices);
        let y_test = features.y.select(Axis(0), &split.test_indices);

        info!(
            n_train = x_train.nrows(),
            n_test = x_test.nrows(),
            n_features = x_train.ncols(),
            "Features prepared"
        );

        let models = training::train(&x_train, &y_train, config.seed)?;

        info!(
            n_samples = dataset.len(),
            seed = config.seed,
            elapsed_ms = timer.elapsed_ms(),
            "Pipeline fitted"
        );

        Ok(Self {
            config: config.clone(),
            dataset,
            encoders,
            split,
            scaler,
            x_scaled,
            y: features.y,
            x_train,
            y_train,
            x_test,
            y_test,
            models,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn encoders(&self) -> &CategoricalEncoders {
        &self.encoders
    }

    pub fn split(&self) -> &TrainTestSplit {
        &self.split
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    pub fn train_data(&self) -> (&Array2<f64>, &Array1<f64>) {
        (&self.x_train, &self.y_train)
    }

    pub fn test_data(&self) -> (&Array2<f64>, &Array1<f64>) {
        (&self.x_test, &self.y_test)
    }

    /// Every row scaled with the training statistics, with its labels
    pub fn scaled_data(&self) -> (&Array2<f64>, &Array1<f64>) {
        (&self.x_scaled, &self.y)
    }

    pub fn evaluate(&self) -> Result<Vec<(String, ClassificationMetrics)>> {
        evaluation::evaluate(&self.models, &self.x_test, &self.y_test)
    }

    pub fn roc(&self) -> Result<Vec<(String, RocCurve)>> {
        evaluation::roc(self.models.classifiers(), &self.x_test, &self.y_test)
    }

    pub fn confusion(&self, model: &str) -> Result<ConfusionMatrix> {
        evaluation::confusion(self.models.get(model)?, &self.x_test, &self.y_test)
    }

    /// Cross-validated F1 of every fixed model on the full scaled matrix
    pub fn cross_validate(&self) -> Result<Vec<CrossValidationSummary>> {
        let timer = Timer::start();
        let summaries = evaluation::cross_validate_all(
            &self.x_scaled,
            &self.y,
            self.config.cv_folds,
            self.config.seed,
        )?;
        info!(
            folds = self.config.cv_folds,
            elapsed_ms = timer.elapsed_ms(),
            "Cross-validation done"
        );
        Ok(summaries)
    }

    /// Logistic regression importances paired with feature names, largest first
    pub fn feature_importances(&self) -> Result<Vec<(String, f64)>> {
        let model = self.models.get(LOGISTIC_REGRESSION)?;
        let mut pairs: Vec<(String, f64)> = match model.feature_importances() {
            Some(importances) => FEATURE_COLUMNS
                .iter()
                .zip(importances.iter())
                .map(|(name, &imp)| (name.to_string(), imp))
                .collect(),
            None => Vec::new(),
        };
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(pairs)
    }

    /// Score one customer with the named model
    pub fn predict(&self, model: &str, profile: &CustomerProfile) -> Result<Prediction> {
        predict_one(self.models.get(model)?, &self.scaler, &self.encoders, profile)
    }

    /// Full evaluation, optionally including cross-validation
    pub fn report(&self, with_cross_validation: bool) -> Result<EvaluationReport> {
        let metrics = self.evaluate()?;
        let mut curves = self.roc()?;

        let mut models = Vec::with_capacity(metrics.len());
        for (name, metrics) in metrics {
            let confusion = self.confusion(&name)?;
            let roc = curves
                .iter()
                .position(|(n, _)| *n == name)
                .map(|i| curves.swap_remove(i).1);
            models.push(ModelEvaluation {
                model: name,
                metrics,
                confusion,
                roc,
            });
        }

        let cross_validation = if with_cross_validation {
            self.cross_validate()?
        } else {
            Vec::new()
        };

        Ok(EvaluationReport {
            n_train: self.split.train_indices.len(),
            n_test: self.split.test_indices.len(),
            seed: self.config.seed,
            models,
            cross_validation,
            feature_importances: self.feature_importances()?,
        })
    }

    /// Names of the fitted models, in report order
    pub fn model_names(&self) -> Vec<String> {
        fixed_specs(self.config.seed).iter().map(|s| s.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChurnError;

    fn small_pipeline() -> ChurnPipeline {
        let config = PipelineConfig::new().with_n_samples(400).with_seed(7);
        ChurnPipeline::fit(&config).unwrap()
    }

    #[test]
    fn test_shapes() {
        let pipeline = small_pipeline();
        let (x_train, y_train) = pipeline.train_data();
        let (x_test, y_test) = pipeline.test_data();

        assert_eq!(x_test.nrows(), 80);
        assert_eq!(x_train.nrows(), 320);
        assert_eq!(y_train.len(), 320);
        assert_eq!(y_test.len(), 80);
        assert_eq!(x_train.ncols(), 13);
        assert_eq!(pipeline.models().len(), 3);
    }

    #[test]
    fn test_unknown_model() {
        let pipeline = small_pipeline();
        assert!(matches!(
            pipeline.confusion("SVM"),
            Err(ChurnError::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_report_has_every_model() {
        let pipeline = small_pipeline();
        let report = pipeline.report(false).unwrap();

        assert_eq!(report.models.len(), 3);
        assert_eq!(
            report.models.iter().map(|m| m.model.clone()).collect::<Vec<_>>(),
            pipeline.model_names()
        );
        for model in &report.models {
            assert_eq!(model.confusion.total(), 80);
            assert!(model.roc.is_some());
        }
        assert_eq!(report.feature_importances.len(), 13);
    }

    #[test]
    fn test_invalid_config() {
        let config = PipelineConfig::new().with_test_size(1.0);
        assert!(matches!(
            ChurnPipeline::fit(&config),
            Err(ChurnError::InvalidParameter { .. })
        ));
    }
}
