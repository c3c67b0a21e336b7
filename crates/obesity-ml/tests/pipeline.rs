//! End-to-end: CSV on disk, training job, saved artifacts, served predictions.

mod common;

use approx::assert_abs_diff_eq;

use obesity_ml::persist::{
    read_artifact, BOOSTING_FILE, ENSEMBLE_FILE, LOGISTIC_FILE, MODEL_STATS_FILE, PREPROCESSING_REPORT_FILE,
    PREPROCESSOR_FILE, RANDOM_FOREST_FILE, SERVING_BUNDLE_FILE,
};
use obesity_ml::training::RandomForestModel;
use obesity_ml::{
    CarePlan, Classifier, InferenceService, ObesityClass, PatientInput, Pipeline, PredictError, TransformBundle,
};

fn trained_service(dir: &std::path::Path) -> InferenceService {
    let config = common::pipeline_config(dir);
    Pipeline::new(config.clone()).run().unwrap();
    InferenceService::load(config.model_dir.join(SERVING_BUNDLE_FILE)).unwrap()
}

#[test]
fn training_job_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::pipeline_config(dir.path());
    let summary = Pipeline::new(config.clone()).run().unwrap();

    for name in [
        RANDOM_FOREST_FILE,
        LOGISTIC_FILE,
        BOOSTING_FILE,
        ENSEMBLE_FILE,
        PREPROCESSOR_FILE,
        SERVING_BUNDLE_FILE,
    ] {
        assert!(config.model_dir.join(name).is_file(), "missing {name}");
    }
    for name in [MODEL_STATS_FILE, PREPROCESSING_REPORT_FILE] {
        assert!(config.output_dir.join(name).is_file(), "missing {name}");
    }
    assert_eq!(summary.artifacts.len(), 8);

    assert_eq!(summary.report.train_samples, 280);
    assert_eq!(summary.report.test_samples, 70);
    assert_eq!(summary.report.num_features, 17);
    assert_eq!(summary.stats.test_size, 70);

    let stats: serde_json::Value =
        serde_json::from_slice(&std::fs::read(config.output_dir.join(MODEL_STATS_FILE)).unwrap()).unwrap();
    for key in ["rf", "lr", "gb", "ensemble"] {
        let accuracy = stats[key]["accuracy"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&accuracy), "{key}: {accuracy}");
    }
}

#[test]
fn saved_base_models_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::pipeline_config(dir.path());
    Pipeline::new(config.clone()).run().unwrap();

    let forest: RandomForestModel = read_artifact(&config.model_dir.join(RANDOM_FOREST_FILE)).unwrap();
    assert_eq!(forest.n_trees(), 12);
    assert_eq!(forest.n_features(), 17);

    let transform: TransformBundle = read_artifact(&config.model_dir.join(PREPROCESSOR_FILE)).unwrap();
    assert_eq!(transform.n_features(), 17);
    assert_eq!(transform.class_names().len(), 7);
}

#[test]
fn predicts_from_six_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let service = trained_service(dir.path());

    let input = PatientInput::new(35, "Male", 175.0, 95.0, "Sedentary", "Yes");
    let prediction = service.predict(&input).unwrap();

    assert_abs_diff_eq!(prediction.bmi, 31.0);
    assert!((0.0..=100.0).contains(&prediction.confidence));
    assert!(service.class_names().contains(&prediction.class_label));
    assert_eq!(prediction.all_probs.len(), 7);
    let total: f64 = prediction.all_probs.values().sum();
    assert_abs_diff_eq!(total, 100.0, epsilon = 0.5);
    let best = prediction.all_probs.values().copied().fold(f64::MIN, f64::max);
    assert_abs_diff_eq!(prediction.confidence, best);

    // Every predicted label has guidance.
    let class: ObesityClass = prediction.class_label.parse().unwrap();
    assert_eq!(CarePlan::lookup(&prediction.class_label).class, class);
}

#[test]
fn heavier_person_is_not_predicted_lighter() {
    let dir = tempfile::tempdir().unwrap();
    let service = trained_service(dir.path());

    let light = service.predict(&PatientInput::new(25, "Female", 165.0, 45.0, "Active", "no")).unwrap();
    let heavy = service.predict(&PatientInput::new(25, "Female", 165.0, 120.0, "Sedentary", "yes")).unwrap();
    let light_class: ObesityClass = light.class_label.parse().unwrap();
    let heavy_class: ObesityClass = heavy.class_label.parse().unwrap();
    assert!(heavy_class > light_class, "{light_class} vs {heavy_class}");
}

#[test]
fn unseen_gender_is_an_unknown_category() {
    let dir = tempfile::tempdir().unwrap();
    let service = trained_service(dir.path());

    let err = service.predict(&PatientInput::new(35, "Other", 175.0, 95.0, "Sedentary", "Yes")).unwrap_err();
    assert!(matches!(err, PredictError::UnknownCategory { ref column, .. } if column == "Gender"));
}

#[test]
fn batch_isolates_bad_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let service = trained_service(dir.path());

    let inputs = [
        PatientInput::new(35, "Male", 175.0, 95.0, "Sedentary", "Yes"),
        PatientInput::new(35, "Male", -1.0, 95.0, "Sedentary", "Yes"),
        PatientInput::new(22, "Female", 160.0, 55.0, "Jogging", "No"),
    ];
    let results = service.predict_batch(&inputs);
    assert_eq!(results.len(), 3);
    assert!(matches!(results[1], Err(PredictError::InvalidInput(_))));

    let single = service.predict(&inputs[0]).unwrap();
    assert_eq!(results[0].as_ref().unwrap(), &single);
    // Unrecognized activity falls back to Moderate instead of failing.
    let moderate = service.predict(&PatientInput::new(22, "Female", 160.0, 55.0, "Moderate", "No")).unwrap();
    assert_eq!(results[2].as_ref().unwrap(), &moderate);
}

#[test]
fn served_ensemble_matches_bundle_stats() {
    let dir = tempfile::tempdir().unwrap();
    let service = trained_service(dir.path());
    let bundle = service.bundle();
    assert_eq!(bundle.ensemble.n_features(), bundle.meta.num_features);
    assert_eq!(bundle.ensemble.members().len(), 3);
    assert_eq!(bundle.stats.class_names, bundle.meta.class_names);
}

#[test]
fn prediction_before_training_reports_missing_model() {
    let dir = tempfile::tempdir().unwrap();
    let err = InferenceService::load(dir.path().join(SERVING_BUNDLE_FILE)).unwrap_err();
    assert!(matches!(err, PredictError::MissingModel(_)));
    assert!(err.to_string().contains("run training first"));
}
