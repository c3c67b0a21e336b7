//! Gradient boosted trees with a softmax objective.
//!
//! Each round computes gradients of the multiclass log loss at the current
//! scores and grows one depth-limited regression tree per class. Scores
//! start from the log class priors.

use bon::Builder;
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::classifier::{check_training_data, map_rows, Classifier, Estimator};
use super::config::ConfigError;
use super::logger::{TrainingLogger, Verbosity};
use super::objective::{multiclass_log_loss, softmax_row_inplace, softmax_rows, Gradients, SoftmaxLoss};
use super::tree_grower::{GainParams, GradientGrower, PresortedFeatures};
use super::TrainError;
use crate::repr::{Forest, ScalarLeaf};
use crate::utils::run_with_threads;

// =============================================================================
// BoostingConfig
// =============================================================================

/// Gradient boosting hyperparameters.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct BoostingConfig {
    /// Number of boosting rounds. Default: 200.
    #[builder(default = 200)]
    pub n_rounds: usize,

    /// Shrinkage applied to every leaf. Default: 0.1.
    #[builder(default = 0.1)]
    pub learning_rate: f64,

    /// Maximum tree depth. Default: 3.
    #[builder(default = 3)]
    pub max_depth: usize,

    /// Split gain and leaf weight regularization.
    #[builder(default)]
    pub gain: GainParams,

    /// Number of threads. 0 uses the global rayon pool.
    #[builder(default)]
    pub n_threads: usize,

    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

impl<S: boosting_config_builder::IsComplete> BoostingConfigBuilder<S> {
    /// Build and validate the configuration.
    pub fn build(self) -> Result<BoostingConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_rounds: 200,
            learning_rate: 0.1,
            max_depth: 3,
            gain: GainParams::default(),
            n_threads: 0,
            verbosity: Verbosity::Silent,
        }
    }
}

impl BoostingConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.n_rounds == 0 {
            return Err(ConfigError::InvalidCount { field: "n_rounds" });
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidCount { field: "max_depth" });
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.gain.reg_lambda.is_nan() || self.gain.reg_lambda < 0.0 {
            return Err(ConfigError::InvalidRegularization {
                field: "reg_lambda",
                value: self.gain.reg_lambda,
            });
        }
        Ok(())
    }
}

// =============================================================================
// BoostingModel
// =============================================================================

/// A fitted boosted ensemble: `n_classes` tree groups plus base scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingModel {
    forest: Forest<ScalarLeaf>,
    n_features: usize,
}

impl BoostingModel {
    pub fn forest(&self) -> &Forest<ScalarLeaf> {
        &self.forest
    }

    /// Raw (pre-softmax) scores.
    pub fn predict_raw(&self, features: ArrayView2<f64>) -> Array2<f64> {
        map_rows(features, self.n_classes(), |row, out| self.forest.predict_row_into(row, out))
    }
}

impl Classifier for BoostingModel {
    fn n_classes(&self) -> usize {
        self.forest.n_groups() as usize
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: ArrayView2<f64>) -> Array2<f64> {
        map_rows(features, self.n_classes(), |row, out| {
            self.forest.predict_row_into(row, out);
            softmax_row_inplace(out);
        })
    }
}

impl Estimator for BoostingConfig {
    type Model = BoostingModel;
    const NAME: &'static str = "gradient_boosting";

    fn fit(
        &self,
        features: ArrayView2<f64>,
        labels: ArrayView1<usize>,
        n_classes: usize,
    ) -> Result<BoostingModel, TrainError> {
        self.validate()?;
        check_training_data(Self::NAME, features, labels, n_classes)?;

        let n_rows = features.nrows();
        let loss = SoftmaxLoss::new(n_classes);
        let base_score = loss.compute_base_score(labels);

        let mut scores = Array2::<f64>::zeros((n_rows, n_classes));
        for mut row in scores.rows_mut() {
            row.iter_mut().zip(&base_score).for_each(|(s, &b)| *s = b);
        }

        let presorted = PresortedFeatures::new(features);
        let grower = GradientGrower::new(features.reborrow(), &presorted, &self.gain, self.max_depth);
        let mut gradients = Gradients::new(n_rows, n_classes);
        let mut forest = Forest::new(n_classes as u32).with_base_score(base_score);

        let mut logger = TrainingLogger::new(self.verbosity, Self::NAME);
        logger.start_training(self.n_rounds);

        run_with_threads(self.n_threads, |parallelism| {
            for round in 0..self.n_rounds {
                loss.compute_gradients(scores.view(), labels, &mut gradients);

                let grown = parallelism.maybe_par_map(0..n_classes, |class| {
                    grower.grow(gradients.grads(class), gradients.hess(class), self.learning_rate)
                });

                for (class, grown) in grown.into_iter().enumerate() {
                    for (row, &leaf) in grown.row_leaves.iter().enumerate() {
                        scores[[row, class]] += grown.tree.leaf_value(leaf).0;
                    }
                    forest.push_tree(grown.tree, class as u32);
                }

                if logger.verbosity() >= Verbosity::Debug {
                    let mut proba = scores.clone();
                    softmax_rows(&mut proba);
                    logger.log_round(round, "train_logloss", multiclass_log_loss(proba.view(), labels));
                }
            }
        });
        logger.finish_training(self.n_rounds);

        Ok(BoostingModel { forest, n_features: features.ncols() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::data::blobs;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn small() -> BoostingConfig {
        BoostingConfig::builder().n_rounds(30).n_threads(1).build().unwrap()
    }

    #[test]
    fn learns_separable_blobs() {
        let (x, y) = blobs(120, 3, 4, 2);
        let model = small().fit(x.view(), y.view(), 3).unwrap();
        assert_eq!(model.forest().n_trees(), 30 * 3);

        let pred = model.predict(x.view());
        let acc = pred.iter().zip(&y).filter(|(p, t)| p == t).count() as f64 / y.len() as f64;
        assert!(acc > 0.9, "train accuracy {acc}");
        for row in model.predict_proba(x.view()).rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn more_rounds_lower_training_loss() {
        let (x, y) = blobs(90, 3, 3, 4);
        let few = BoostingConfig::builder().n_rounds(3).n_threads(1).build().unwrap();
        let few = few.fit(x.view(), y.view(), 3).unwrap();
        let many = small().fit(x.view(), y.view(), 3).unwrap();
        let loss = |m: &BoostingModel| multiclass_log_loss(m.predict_proba(x.view()).view(), y.view());
        assert!(loss(&many) < loss(&few));
    }

    #[test]
    fn uninformative_features_predict_priors() {
        let x = array![[1.0], [1.0], [1.0], [1.0]];
        let y = array![0usize, 0, 0, 1];
        let model = small().fit(x.view(), y.view(), 2).unwrap();
        let p = model.predict_proba(x.view());
        assert_abs_diff_eq!(p[[0, 0]], 0.75, epsilon = 1e-9);
    }

    #[test]
    fn raw_scores_start_at_base() {
        let (x, y) = blobs(30, 2, 2, 8);
        let model = BoostingConfig::builder().n_rounds(1).build().unwrap();
        let model = model.fit(x.view(), y.view(), 2).unwrap();
        assert_eq!(model.forest().base_score().len(), 2);
        assert_eq!(model.predict_raw(x.view()).dim(), (30, 2));
    }

    #[test]
    fn rejects_bad_learning_rate() {
        assert_eq!(
            BoostingConfig::builder().learning_rate(0.0).build().unwrap_err(),
            ConfigError::InvalidLearningRate(0.0)
        );
    }
}
