//! Fits the three base models and the soft-voting ensemble, then scores all
//! four on the held-out split.

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::boosting::BoostingModel;
use super::classifier::{Classifier, Estimator};
use super::config::TrainingConfig;
use super::forest::RandomForestModel;
use super::linear::LogisticModel;
use super::metrics::ClassificationScores;
use super::voting::{FittedModel, SoftVotingEnsemble};
use super::TrainError;
use crate::data::PreparedData;

/// Decimal places kept in [`ModelStats`].
const STATS_DECIMALS: i32 = 4;

/// Held-out evaluation of every model, as written to `model_stats.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub rf: ClassificationScores,
    pub lr: ClassificationScores,
    pub gb: ClassificationScores,
    pub ensemble: ClassificationScores,
    pub class_names: Vec<String>,
    pub num_features: usize,
    pub train_size: usize,
    pub test_size: usize,
}

impl ModelStats {
    /// `(name, scores)` for every model in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ClassificationScores)> {
        [("rf", &self.rf), ("lr", &self.lr), ("gb", &self.gb), ("ensemble", &self.ensemble)].into_iter()
    }
}

/// Output of a training run.
#[derive(Debug, Clone)]
pub struct TrainedModels {
    pub random_forest: RandomForestModel,
    pub logistic: LogisticModel,
    pub boosting: BoostingModel,
    pub ensemble: SoftVotingEnsemble,
    pub stats: ModelStats,
}

/// Runs the full model fit for one prepared dataset.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on the partitions of a [`PreparedData`].
    pub fn train_prepared(&self, data: &PreparedData) -> Result<TrainedModels, TrainError> {
        self.train(
            data.train_features.view(),
            data.train_labels.view(),
            data.test_features.view(),
            data.test_labels.view(),
            data.bundle.class_names(),
        )
    }

    /// Fit every model on the training split and evaluate on the test split.
    ///
    /// Any fit failure aborts the whole run.
    pub fn train(
        &self,
        train_features: ArrayView2<f64>,
        train_labels: ArrayView1<usize>,
        test_features: ArrayView2<f64>,
        test_labels: ArrayView1<usize>,
        class_names: &[String],
    ) -> Result<TrainedModels, TrainError> {
        self.config.validate()?;
        if test_features.ncols() != train_features.ncols() {
            return Err(TrainError::ShapeMismatch {
                expected: train_features.ncols(),
                actual: test_features.ncols(),
            });
        }
        let n_classes = class_names.len();

        let mut forest = self.config.forest.clone();
        forest.verbosity = forest.verbosity.max(self.config.verbosity);
        if forest.n_threads == 0 {
            forest.n_threads = self.config.n_threads;
        }
        let mut logistic = self.config.logistic.clone();
        logistic.verbosity = logistic.verbosity.max(self.config.verbosity);
        let mut boosting = self.config.boosting.clone();
        boosting.verbosity = boosting.verbosity.max(self.config.verbosity);
        if boosting.n_threads == 0 {
            boosting.n_threads = self.config.n_threads;
        }

        let random_forest = forest.fit(train_features, train_labels, n_classes)?;
        let logistic = logistic.fit(train_features, train_labels, n_classes)?;
        let boosting = boosting.fit(train_features, train_labels, n_classes)?;

        let ensemble = SoftVotingEnsemble::new(vec![
            FittedModel::from(random_forest.clone()),
            FittedModel::from(logistic.clone()),
            FittedModel::from(boosting.clone()),
        ])?;

        let truth = test_labels.to_vec();
        let score = |model: &dyn Classifier| {
            let pred = model.predict(test_features).to_vec();
            ClassificationScores::evaluate(&truth, &pred, n_classes).rounded(STATS_DECIMALS)
        };
        let stats = ModelStats {
            rf: score(&random_forest),
            lr: score(&logistic),
            gb: score(&boosting),
            ensemble: score(&ensemble),
            class_names: class_names.to_vec(),
            num_features: train_features.ncols(),
            train_size: train_features.nrows(),
            test_size: test_features.nrows(),
        };
        for (model, s) in stats.iter() {
            tracing::info!(model, accuracy = s.accuracy, f1 = s.f1, precision = s.precision, recall = s.recall, "evaluation");
        }

        Ok(TrainedModels { random_forest, logistic, boosting, ensemble, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Preprocessor;
    use crate::testing::data::synthetic_table;
    use crate::training::{BoostingConfig, ForestConfig, Verbosity};

    fn quick_config() -> TrainingConfig {
        TrainingConfig::builder()
            .forest(ForestConfig::builder().n_trees(10).build().unwrap())
            .boosting(BoostingConfig::builder().n_rounds(10).build().unwrap())
            .n_threads(1)
            .verbosity(Verbosity::Silent)
            .build()
            .unwrap()
    }

    #[test]
    fn trains_and_reports_all_models() {
        let data = Preprocessor::default().prepare(synthetic_table(350, 7)).unwrap();
        let models = Trainer::new(quick_config()).train_prepared(&data).unwrap();

        let stats = &models.stats;
        assert_eq!(stats.class_names.len(), 7);
        assert_eq!(stats.num_features, 17);
        assert_eq!(stats.train_size + stats.test_size, 350);
        for (name, s) in stats.iter() {
            for v in [s.accuracy, s.f1, s.precision, s.recall] {
                assert!((0.0..=1.0).contains(&v), "{name}: {v}");
            }
        }
        assert_eq!(models.ensemble.n_classes(), 7);
        assert_eq!(models.random_forest.n_trees(), 10);
    }

    #[test]
    fn single_class_training_fold_is_fatal() {
        let x = ndarray::Array2::<f64>::zeros((4, 2));
        let y = ndarray::Array1::<usize>::zeros(4);
        let names = vec!["a".to_string(), "b".to_string()];
        let err = Trainer::new(quick_config()).train(x.view(), y.view(), x.view(), y.view(), &names).unwrap_err();
        assert!(matches!(err, TrainError::DegenerateFold { n_classes: 1 }));
    }

    #[test]
    fn stats_serialize_with_report_keys() {
        let stats = ModelStats {
            rf: ClassificationScores::default(),
            lr: ClassificationScores::default(),
            gb: ClassificationScores::default(),
            ensemble: ClassificationScores::default(),
            class_names: vec!["x".into()],
            num_features: 17,
            train_size: 8,
            test_size: 2,
        };
        let json = serde_json::to_value(&stats).unwrap();
        for key in ["rf", "lr", "gb", "ensemble", "class_names", "num_features", "train_size", "test_size"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["ensemble"].get("f1").is_some());
    }
}
