//! Integration test: training and evaluation end-to-end

use churnguard::cache::PipelineCache;
use churnguard::config::PipelineConfig;
use churnguard::evaluation::{cross_validate, ClassificationMetrics};
use churnguard::pipeline::ChurnPipeline;
use churnguard::training::{Classifier, ModelSpec, KNN_11, KNN_5, LOGISTIC_REGRESSION};
use std::sync::Arc;

fn default_pipeline() -> ChurnPipeline {
    ChurnPipeline::fit(&PipelineConfig::default()).unwrap()
}

#[test]
fn test_default_run_confusion_sums_to_test_size() {
    let pipeline = default_pipeline();
    assert_eq!(pipeline.split().test_indices.len(), 1000);
    assert_eq!(pipeline.split().train_indices.len(), 4000);

    for name in [LOGISTIC_REGRESSION, KNN_5, KNN_11] {
        let cm = pipeline.confusion(name).unwrap();
        assert_eq!(cm.total(), 1000, "{}", name);
    }
}

#[test]
fn test_accuracy_matches_confusion() {
    let pipeline = default_pipeline();
    let metrics = pipeline.evaluate().unwrap();
    assert_eq!(metrics.len(), 3);

    for (name, m) in &metrics {
        let cm = pipeline.confusion(name).unwrap();
        let expected = (cm.true_positives() + cm.true_negatives()) as f64 / cm.total() as f64;
        assert!((m.accuracy - expected).abs() < 1e-12, "{}", name);
        assert_eq!(*m, ClassificationMetrics::from_confusion(&cm));
        for v in [m.accuracy, m.precision, m.recall, m.f1] {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}

#[test]
fn test_logistic_regression_is_reproducible() {
    let a = default_pipeline();
    let b = default_pipeline();
    let acc = |p: &ChurnPipeline| {
        p.evaluate()
            .unwrap()
            .into_iter()
            .find(|(n, _)| n == LOGISTIC_REGRESSION)
            .map(|(_, m)| m.accuracy)
            .unwrap()
    };
    assert_eq!(acc(&a), acc(&b));
    assert!(acc(&a) > 0.6);
}

#[test]
fn test_roc_curves() {
    let pipeline = default_pipeline();
    let curves = pipeline.roc().unwrap();
    assert_eq!(curves.len(), 3);

    for (name, curve) in &curves {
        assert_eq!(curve.fpr.len(), curve.tpr.len());
        assert_eq!(curve.fpr.len(), curve.thresholds.len());
        assert_eq!((curve.fpr[0], curve.tpr[0]), (0.0, 0.0));
        assert_eq!(*curve.fpr.last().unwrap(), 1.0);
        assert_eq!(*curve.tpr.last().unwrap(), 1.0);
        assert!(curve.fpr.windows(2).all(|w| w[0] <= w[1]), "{}", name);
        assert!(curve.auc > 0.5 && curve.auc <= 1.0, "{} auc {}", name, curve.auc);
    }
}

#[test]
fn test_cross_validation_bounds() {
    let pipeline = default_pipeline();
    let summaries = pipeline.cross_validate().unwrap();
    assert_eq!(summaries.len(), 3);

    for s in &summaries {
        assert_eq!(s.fold_scores.len(), 5);
        assert!(s.min <= s.mean && s.mean <= s.max, "{:?}", s);
        assert_eq!(s.n_folds, 5);
    }
}

#[test]
fn test_single_spec_cross_validation_matches_batch() {
    let pipeline = ChurnPipeline::fit(&PipelineConfig::new().with_n_samples(600)).unwrap();
    let all = pipeline.cross_validate().unwrap();

    let (x, y) = pipeline.scaled_data();
    assert_eq!(x.nrows(), 600);
    let single = cross_validate(&ModelSpec::Knn { k: 5 }, x, y, 5).unwrap();
    assert_eq!(single.model, all[1].model);
    assert_eq!(single.fold_scores, all[1].fold_scores);
    assert_eq!(single, all[1]);
}

#[test]
fn test_logistic_importances() {
    let pipeline = default_pipeline();
    let model = pipeline.models().get(LOGISTIC_REGRESSION).unwrap();
    let importances = model.feature_importances().unwrap();
    assert_eq!(importances.len(), 13);
    assert!(importances.iter().all(|&v| v >= 0.0));

    let ranked = pipeline.feature_importances().unwrap();
    assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[test]
fn test_report_render() {
    let pipeline = ChurnPipeline::fit(&PipelineConfig::new().with_n_samples(500)).unwrap();
    let report = pipeline.report(true).unwrap();
    let text = report.render();

    for name in [LOGISTIC_REGRESSION, KNN_5, KNN_11] {
        assert!(text.contains(name));
    }
    assert_eq!(report.cross_validation.len(), 3);
    assert!(report.best_model().is_some());
}

#[test]
fn test_cache_shares_pipelines() {
    let cache = PipelineCache::new();
    let config = PipelineConfig::new().with_n_samples(300);

    let a = cache.pipeline(&config).unwrap();
    let b = cache.pipeline(&config).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(a.dataset(), &cache.dataset(300, 42).unwrap()));

    let c = cache.pipeline(&config.clone().with_test_size(0.3)).unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(cache.pipeline_stats().entries, 2);
}
