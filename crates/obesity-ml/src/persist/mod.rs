//! Model artifact persistence.
//!
//! [`codec`] defines the versioned on-disk envelope, [`ArtifactStore`] the
//! file layout of a training run, and [`ServingBundle`] the single artifact
//! consumed at inference time.

mod bundle;
pub mod codec;
mod store;

pub use bundle::{ModelMeta, ServingBundle};
pub use codec::{read_artifact, write_artifact, Format, MAGIC, SCHEMA_VERSION};
pub use store::{
    load_bundle, ArtifactStore, BOOSTING_FILE, ENSEMBLE_FILE, LOGISTIC_FILE, MODEL_STATS_FILE,
    PREPROCESSING_REPORT_FILE, PREPROCESSOR_FILE, RANDOM_FOREST_FILE, SERVING_BUNDLE_FILE,
};

/// Errors raised while writing or reading artifacts.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encode(#[source] postcard::Error),

    #[error("decoding error: {0}")]
    Decode(#[source] postcard::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file is not an artifact written by this crate.
    #[error("not a model artifact (bad magic)")]
    BadMagic,

    /// Artifacts are only readable by the schema version that wrote them.
    #[error("unsupported artifact schema version {found}, expected {expected}")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("artifact truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The artifact decoded but its contents are inconsistent.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}
