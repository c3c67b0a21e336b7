//! Model fitting and evaluation.
//!
//! # Overview
//!
//! Three base classifiers are fit on the prepared training split:
//!
//! - [`ForestConfig`] → [`RandomForestModel`]: bagged Gini trees
//! - [`LogisticConfig`] → [`LogisticModel`]: multinomial logistic regression
//! - [`BoostingConfig`] → [`BoostingModel`]: softmax gradient boosted trees
//!
//! Each configuration implements [`Estimator`]; each fitted model implements
//! [`Classifier`]. The [`Trainer`] combines them into a
//! [`SoftVotingEnsemble`] and scores all four on the held-out split.

mod boosting;
mod classifier;
mod config;
mod forest;
mod linear;
mod logger;
pub mod metrics;
pub mod objective;
mod trainer;
pub mod tree_grower;
mod voting;

pub use boosting::{BoostingConfig, BoostingModel};
pub use classifier::{Classifier, Estimator};
pub use config::{ConfigError, TrainingConfig};
pub use forest::{ForestConfig, MaxFeatures, RandomForestModel};
pub use linear::{LogisticConfig, LogisticModel};
pub use logger::{TrainingLogger, Verbosity};
pub use metrics::{ClassificationScores, ConfusionMatrix};
pub use trainer::{ModelStats, TrainedModels, Trainer};
pub use tree_grower::GainParams;
pub use voting::{FittedModel, SoftVotingEnsemble};

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while fitting models. All of them abort the training run.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    /// The training labels contain fewer than two distinct classes.
    #[error("training fold is degenerate: {n_classes} distinct class(es)")]
    DegenerateFold { n_classes: usize },

    /// A model could not be fit.
    #[error("{model} failed to fit: {reason}")]
    FitFailure { model: &'static str, reason: String },

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
