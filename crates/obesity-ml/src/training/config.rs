//! Training configuration.
//!
//! [`TrainingConfig`] composes the per-model configurations and uses the
//! `bon` crate for builder generation with validation at `build()` time.
//!
//! # Example
//!
//! ```
//! use obesity_ml::training::{ForestConfig, TrainingConfig};
//!
//! let config = TrainingConfig::builder()
//!     .forest(ForestConfig::builder().n_trees(50).build().unwrap())
//!     .n_threads(2)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.forest.n_trees, 50);
//! ```

use bon::Builder;

use super::boosting::BoostingConfig;
use super::forest::ForestConfig;
use super::linear::LogisticConfig;
use super::logger::Verbosity;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count (trees, rounds, iterations) must be at least 1.
    InvalidCount { field: &'static str },
    /// Learning rate must be positive.
    InvalidLearningRate(f64),
    /// Regularization strength must be positive (or non-negative where noted).
    InvalidRegularization { field: &'static str, value: f64 },
    /// A fraction must lie in the open interval (0, 1).
    InvalidFraction { field: &'static str, value: f64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCount { field } => write!(f, "{} must be at least 1", field),
            Self::InvalidLearningRate(v) => {
                write!(f, "learning_rate must be positive, got {}", v)
            }
            Self::InvalidRegularization { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            Self::InvalidFraction { field, value } => {
                write!(f, "{} must be in (0, 1), got {}", field, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// TrainingConfig
// =============================================================================

/// Configuration for fitting all models of the ensemble.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct TrainingConfig {
    /// Random forest parameters.
    #[builder(default)]
    pub forest: ForestConfig,

    /// Logistic regression parameters.
    #[builder(default)]
    pub logistic: LogisticConfig,

    /// Gradient boosting parameters.
    #[builder(default)]
    pub boosting: BoostingConfig,

    /// Number of threads. 0 uses the global rayon pool, 1 runs sequentially.
    #[builder(default)]
    pub n_threads: usize,

    /// Verbosity of per-model training logs. Default: `Info`.
    #[builder(default = Verbosity::Info)]
    pub verbosity: Verbosity,
}

impl<S: training_config_builder::IsComplete> TrainingConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any nested configuration is invalid.
    pub fn build(self) -> Result<TrainingConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl TrainingConfig {
    /// Validate every nested configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.forest.validate()?;
        self.logistic.validate()?;
        self.boosting.validate()?;
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            logistic: LogisticConfig::default(),
            boosting: BoostingConfig::default(),
            n_threads: 0,
            verbosity: Verbosity::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builder() {
        let built = TrainingConfig::builder().build().unwrap();
        let default = TrainingConfig::default();
        assert_eq!(built.forest, default.forest);
        assert_eq!(built.logistic, default.logistic);
        assert_eq!(built.boosting, default.boosting);
        assert_eq!(built.verbosity, Verbosity::Info);
    }

    #[test]
    fn nested_errors_surface() {
        let mut forest = ForestConfig::default();
        forest.n_trees = 0;
        let err = TrainingConfig::builder().forest(forest).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidCount { field: "n_trees" });
        assert_eq!(err.to_string(), "n_trees must be at least 1");
    }
}
