//! obesity-ml: obesity category estimation from six everyday attributes.
//!
//! The crate covers the offline training job and the serving-time
//! prediction path of a small tabular classifier, plus static guidance
//! content for each predicted category.
//!
//! # Key Types
//!
//! - [`Preprocessor`] / [`TransformBundle`] - Cleaning, encoding, split and scaling
//! - [`Trainer`] / [`TrainingConfig`] - Random forest, logistic regression,
//!   gradient boosting and their soft-voting ensemble
//! - [`ArtifactStore`] / [`ServingBundle`] - Versioned model artifacts
//! - [`InferenceService`] / [`PatientInput`] - Predictions from user inputs
//! - [`CarePlan`] / [`ObesityClass`] - Nutrition and exercise guidance
//!
//! # Training
//!
//! Configure a [`PipelineConfig`] and call [`Pipeline::run`], or drive
//! [`Preprocessor::prepare`] and [`Trainer::train_prepared`] directly.
//!
//! # Prediction
//!
//! Load the serving bundle once with [`InferenceService::load`] and share
//! the service; predictions only read it.

pub mod content;
pub mod data;
pub mod inference;
pub mod persist;
pub mod pipeline;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use data::{DatasetError, PreparedData, PreprocessingReport, Preprocessor, RawTable, TransformBundle};

pub use training::{
    BoostingConfig, Classifier, ForestConfig, LogisticConfig, ModelStats, SoftVotingEnsemble, TrainError,
    TrainedModels, Trainer, TrainingConfig, Verbosity,
};

pub use persist::{ArtifactStore, PersistError, ServingBundle};

pub use inference::{ActivityLevel, InferenceService, PatientInput, PredictError, Prediction};

pub use content::{CarePlan, ObesityClass};

pub use pipeline::{Pipeline, PipelineConfig, PipelineError, RunSummary};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
