//! Serving-time prediction from the six user inputs.
//!
//! # Overview
//!
//! [`InferenceService`] owns a loaded [`ServingBundle`](crate::persist::ServingBundle).
//! For each request it:
//!
//! 1. Validates the [`PatientInput`]
//! 2. Rebuilds the full feature row ([`FeatureAssembler`]): observed values,
//!    derived BMI, activity frequency, and fixed defaults for the rest
//! 3. Applies the persisted scaler (never refit)
//! 4. Runs the soft-voting ensemble and rounds the result for presentation

use std::path::PathBuf;

mod assembly;
mod input;
mod service;

pub use assembly::{AssemblyMode, FeatureAssembler, DEFAULT_FILLS};
pub use input::{ActivityLevel, PatientInput};
pub use service::{InferenceService, Prediction};

use crate::persist::PersistError;

/// Errors surfaced to prediction callers.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    /// No serving bundle exists yet.
    #[error("no trained model found at {}; run training first", .0.display())]
    MissingModel(PathBuf),

    /// The bundle exists but could not be loaded.
    #[error("failed to load model: {0}")]
    Persist(#[from] PersistError),

    /// A categorical input was never seen during training.
    #[error("unknown value '{value}' for '{column}'")]
    UnknownCategory { column: String, value: String },

    /// A feature column had no value under strict assembly.
    #[error("no value for feature column '{0}'")]
    MissingFeature(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Anything else that went wrong while scoring a request.
    #[error("prediction failed: {0}")]
    Prediction(String),
}
