//! Integration test: single-customer scoring

use churnguard::config::PipelineConfig;
use churnguard::error::ChurnError;
use churnguard::inference::{predict_one, RiskFlag, RiskLevel};
use churnguard::pipeline::ChurnPipeline;
use churnguard::synthetic::CustomerProfile;
use churnguard::training::{Classifier, KNN_11, KNN_5, LOGISTIC_REGRESSION};
use ndarray::Axis;

fn pipeline() -> ChurnPipeline {
    ChurnPipeline::fit(&PipelineConfig::new().with_n_samples(1500)).unwrap()
}

#[test]
fn test_training_rows_predict_consistently() {
    let pipeline = pipeline();
    let (x_train, _) = pipeline.train_data();
    let records = pipeline.dataset().records();

    for name in [LOGISTIC_REGRESSION, KNN_5, KNN_11] {
        let model = pipeline.models().get(name).unwrap();
        let batch = model.predict(x_train).unwrap();

        for (row, &index) in pipeline.split().train_indices.iter().enumerate().take(50) {
            let prediction = pipeline.predict(name, &records[index].profile).unwrap();
            assert_eq!(f64::from(prediction.label), batch[row], "{} row {}", name, row);
        }
    }
}

#[test]
fn test_probability_matches_model() {
    let pipeline = pipeline();
    let (x_test, _) = pipeline.test_data();
    let records = pipeline.dataset().records();
    let model = pipeline.models().get(LOGISTIC_REGRESSION).unwrap();

    let index = pipeline.split().test_indices[0];
    let row = x_test.row(0).insert_axis(Axis(0)).to_owned();
    let expected = model.predict_proba(&row).unwrap().unwrap()[0];

    let prediction = predict_one(
        model,
        pipeline.scaler(),
        pipeline.encoders(),
        &records[index].profile,
    )
    .unwrap();
    assert!((prediction.probability - expected).abs() < 1e-12);
    assert_eq!(prediction.risk_level, RiskLevel::from_probability(expected));
}

#[test]
fn test_high_risk_profile() {
    let pipeline = pipeline();
    let profile = CustomerProfile {
        tenure_months: 2,
        satisfaction_score: 1.5,
        support_tickets: 7,
        monthly_charges: 120.0,
        num_services: 1,
        ..CustomerProfile::default()
    };

    let prediction = pipeline.predict(LOGISTIC_REGRESSION, &profile).unwrap();
    assert_eq!(prediction.risk_flags, RiskFlag::ALL.to_vec());
    assert!(prediction.probability > 0.5);
    assert!(prediction.is_churn());
    assert_eq!(prediction.recommendations()[0], "Contact proactif");
}

#[test]
fn test_low_risk_profile() {
    let pipeline = pipeline();
    let profile = CustomerProfile {
        contract_type: "Bi-annuel".to_string(),
        tenure_months: 60,
        satisfaction_score: 4.8,
        support_tickets: 0,
        monthly_charges: 35.0,
        num_services: 6,
        ..CustomerProfile::default()
    };

    let prediction = pipeline.predict(LOGISTIC_REGRESSION, &profile).unwrap();
    assert!(prediction.risk_flags.is_empty());
    assert!(prediction.probability < 0.5);
    assert_eq!(prediction.label, 0);
    assert_eq!(prediction.recommendations()[0], "Remercier sa fidélité");
}

#[test]
fn test_knn_probability_is_neighbour_share() {
    let pipeline = pipeline();
    let prediction = pipeline.predict(KNN_5, &CustomerProfile::default()).unwrap();
    let fifths = prediction.probability * 5.0;
    assert!((fifths - fifths.round()).abs() < 1e-9);
}

#[test]
fn test_unknown_category_and_model() {
    let pipeline = pipeline();
    let profile = CustomerProfile {
        online_activity: "Inexistante".to_string(),
        ..CustomerProfile::default()
    };
    assert!(matches!(
        pipeline.predict(LOGISTIC_REGRESSION, &profile),
        Err(ChurnError::UnknownCategory { .. })
    ));
    assert!(matches!(
        pipeline.predict("Random Forest", &CustomerProfile::default()),
        Err(ChurnError::ModelNotFound(_))
    ));
}
