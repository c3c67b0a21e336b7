//! The offline training job: prepare, train, persist.
//!
//! ```no_run
//! use obesity_ml::pipeline::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .data_path("data/ObesityDataSet.csv".into())
//!     .build()
//!     .unwrap();
//! let summary = Pipeline::new(config).run().unwrap();
//! println!("ensemble accuracy: {}", summary.stats.ensemble.accuracy);
//! ```

use std::path::PathBuf;

use bon::Builder;

use crate::data::{DatasetError, PreparedData, PreprocessingReport, Preprocessor};
use crate::persist::{ArtifactStore, PersistError};
use crate::training::{ConfigError, ModelStats, TrainError, Trainer, TrainingConfig, Verbosity};

/// Errors of the offline job. All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("training failed: {0}")]
    Train(#[from] TrainError),

    #[error("failed to save artifacts: {0}")]
    Persist(#[from] PersistError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// PipelineConfig
// =============================================================================

/// Paths and split parameters for one run.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct PipelineConfig {
    /// Raw CSV dataset.
    #[builder(default = PathBuf::from("data/ObesityDataSet.csv"))]
    pub data_path: PathBuf,

    /// Directory for model artifacts.
    #[builder(default = PathBuf::from("models"))]
    pub model_dir: PathBuf,

    /// Directory for JSON reports.
    #[builder(default = PathBuf::from("outputs"))]
    pub output_dir: PathBuf,

    /// Fraction of rows held out for evaluation. Default: 0.2.
    #[builder(default = 0.2)]
    pub test_size: f64,

    /// Seed for the split and every model. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    /// Number of threads. 0 uses the global rayon pool.
    #[builder(default)]
    pub n_threads: usize,

    #[builder(default = Verbosity::Info)]
    pub verbosity: Verbosity,

    /// Model parameters. `seed`, `n_threads` and `verbosity` above override
    /// the corresponding nested values.
    #[builder(default)]
    pub training: TrainingConfig,
}

impl<S: pipeline_config_builder::IsComplete> PipelineConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `test_size` is outside (0, 1) or any model
    /// configuration is invalid.
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/ObesityDataSet.csv"),
            model_dir: PathBuf::from("models"),
            output_dir: PathBuf::from("outputs"),
            test_size: 0.2,
            seed: 42,
            n_threads: 0,
            verbosity: Verbosity::Info,
            training: TrainingConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.test_size.is_nan() || self.test_size <= 0.0 || self.test_size >= 1.0 {
            return Err(ConfigError::InvalidFraction { field: "test_size", value: self.test_size });
        }
        self.training.validate()
    }

    pub fn preprocessor(&self) -> Preprocessor {
        Preprocessor::new(self.test_size, self.seed)
    }

    /// Model parameters with the run-wide settings applied.
    pub fn training_config(&self) -> TrainingConfig {
        let mut training = self.training.clone();
        training.forest.seed = self.seed;
        training.n_threads = self.n_threads;
        training.verbosity = self.verbosity;
        training
    }

    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::new(self.model_dir.clone(), self.output_dir.clone())
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: PreprocessingReport,
    pub stats: ModelStats,
    /// Every file written, in write order.
    pub artifacts: Vec<PathBuf>,
}

/// Runs the offline job for one [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load and preprocess the dataset, and write the preprocessing report.
    pub fn run_preprocess(&self) -> Result<(PreparedData, PathBuf), PipelineError> {
        self.config.validate()?;
        let prepared = self.config.preprocessor().prepare_path(&self.config.data_path)?;
        let report_path = self.config.store().save_report(&prepared.report)?;
        Ok((prepared, report_path))
    }

    /// Preprocess, train every model, and persist all artifacts.
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        let (prepared, report_path) = self.run_preprocess()?;
        tracing::info!(
            train = prepared.report.train_samples,
            test = prepared.report.test_samples,
            features = prepared.report.num_features,
            "preprocessing complete"
        );

        let trainer = Trainer::new(self.config.training_config());
        let models = trainer.train_prepared(&prepared)?;

        let mut artifacts = vec![report_path];
        artifacts.extend(self.config.store().save_training(&models, &prepared.bundle)?);
        tracing::info!(
            artifacts = artifacts.len(),
            model_dir = %self.config.model_dir.display(),
            "training pipeline complete"
        );

        Ok(RunSummary { report: prepared.report, stats: models.stats, artifacts })
    }
}
