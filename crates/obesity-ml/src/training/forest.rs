//! Random forest classifier.
//!
//! Bagged Gini trees: every tree sees a bootstrap sample of the rows and a
//! random subset of features at each split. Class probabilities are the mean
//! of the per-tree leaf distributions.

use bon::Builder;
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::classifier::{check_training_data, map_rows, Classifier, Estimator};
use super::config::ConfigError;
use super::logger::{TrainingLogger, Verbosity};
use super::tree_grower::{CartGrower, CartParams};
use super::TrainError;
use crate::repr::{ClassDistribution, Forest};
use crate::utils::run_with_threads;

/// Number of features examined per split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1.
    #[default]
    Sqrt,
    /// Every feature.
    All,
    /// A fixed count (clamped to `1..=n_features`).
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let n = match self {
            Self::Sqrt => (n_features as f64).sqrt().floor() as usize,
            Self::All => n_features,
            Self::Count(c) => c,
        };
        n.clamp(1, n_features.max(1))
    }
}

// =============================================================================
// ForestConfig
// =============================================================================

/// Random forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ForestConfig {
    /// Number of trees. Default: 200.
    #[builder(default = 200)]
    pub n_trees: usize,

    /// Maximum tree depth. `None` grows until leaves are pure.
    pub max_depth: Option<usize>,

    /// Minimum rows required to split a node. Default: 2.
    #[builder(default = 2)]
    pub min_samples_split: usize,

    /// Minimum rows in each leaf. Default: 1.
    #[builder(default = 1)]
    pub min_samples_leaf: usize,

    /// Features examined per split. Default: `Sqrt`.
    #[builder(default)]
    pub max_features: MaxFeatures,

    /// Fit every tree on a bootstrap sample. Default: true.
    #[builder(default = true)]
    pub bootstrap: bool,

    /// Random seed. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    /// Number of threads. 0 uses the global rayon pool.
    #[builder(default)]
    pub n_threads: usize,

    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

impl<S: forest_config_builder::IsComplete> ForestConfigBuilder<S> {
    /// Build and validate the configuration.
    pub fn build(self) -> Result<ForestConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
            n_threads: 0,
            verbosity: Verbosity::Silent,
        }
    }
}

impl ForestConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidCount { field: "n_trees" });
        }
        if self.min_samples_split < 2 {
            return Err(ConfigError::InvalidCount { field: "min_samples_split" });
        }
        if self.min_samples_leaf == 0 {
            return Err(ConfigError::InvalidCount { field: "min_samples_leaf" });
        }
        if self.max_depth == Some(0) {
            return Err(ConfigError::InvalidCount { field: "max_depth" });
        }
        Ok(())
    }
}

// =============================================================================
// RandomForestModel
// =============================================================================

/// A fitted random forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestModel {
    forest: Forest<ClassDistribution>,
    n_classes: usize,
    n_features: usize,
}

impl RandomForestModel {
    /// The underlying trees.
    pub fn forest(&self) -> &Forest<ClassDistribution> {
        &self.forest
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }
}

impl Classifier for RandomForestModel {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: ArrayView2<f64>) -> Array2<f64> {
        map_rows(features, self.n_classes, |row, out| self.forest.predict_row_into(row, out))
    }
}

impl Estimator for ForestConfig {
    type Model = RandomForestModel;
    const NAME: &'static str = "random_forest";

    fn fit(
        &self,
        features: ArrayView2<f64>,
        labels: ArrayView1<usize>,
        n_classes: usize,
    ) -> Result<RandomForestModel, TrainError> {
        self.validate()?;
        check_training_data(Self::NAME, features, labels, n_classes)?;

        let n_rows = features.nrows();
        let n_features = features.ncols();
        let params = CartParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.resolve(n_features),
        };

        let mut logger = TrainingLogger::new(self.verbosity, Self::NAME);
        logger.start_training(self.n_trees);

        let grower = CartGrower::new(features.reborrow(), labels.reborrow(), n_classes, params);
        // One RNG per tree, so results do not depend on scheduling.
        let trees = run_with_threads(self.n_threads, |parallelism| {
            parallelism.maybe_par_map(0..self.n_trees, |tree_idx| {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(tree_idx as u64));
                let rows: Vec<usize> = if self.bootstrap {
                    (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
                } else {
                    (0..n_rows).collect()
                };
                grower.grow(rows, &mut rng)
            })
        });

        let mut forest = Forest::new(1);
        for (i, tree) in trees.into_iter().enumerate() {
            logger.log_round(i, "leaves", tree.n_leaves() as f64);
            forest.push_tree(tree, 0);
        }
        logger.finish_training(forest.n_trees());

        Ok(RandomForestModel { forest, n_classes, n_features })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::data::blobs;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn small() -> ForestConfig {
        ForestConfig::builder().n_trees(15).n_threads(1).build().unwrap()
    }

    #[rstest]
    #[case(MaxFeatures::Sqrt, 17, 4)]
    #[case(MaxFeatures::Sqrt, 1, 1)]
    #[case(MaxFeatures::All, 17, 17)]
    #[case(MaxFeatures::Count(40), 17, 17)]
    #[case(MaxFeatures::Count(0), 17, 1)]
    fn max_features_resolution(#[case] mf: MaxFeatures, #[case] n: usize, #[case] expected: usize) {
        assert_eq!(mf.resolve(n), expected);
    }

    #[test]
    fn learns_separable_blobs() {
        let (x, y) = blobs(120, 3, 4, 1);
        let model = small().fit(x.view(), y.view(), 3).unwrap();
        assert_eq!(model.n_trees(), 15);

        let pred = model.predict(x.view());
        let acc = pred.iter().zip(&y).filter(|(p, t)| p == t).count() as f64 / y.len() as f64;
        assert!(acc > 0.9, "train accuracy {acc}");

        for row in model.predict_proba(x.view()).rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn deterministic_across_thread_counts() {
        let (x, y) = blobs(60, 3, 3, 9);
        let seq = small().fit(x.view(), y.view(), 3).unwrap();
        let mut par_config = small();
        par_config.n_threads = 2;
        let par = par_config.fit(x.view(), y.view(), 3).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn rejects_zero_trees() {
        assert_eq!(
            ForestConfig::builder().n_trees(0).build().unwrap_err(),
            ConfigError::InvalidCount { field: "n_trees" }
        );
    }
}
