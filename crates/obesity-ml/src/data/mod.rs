//! Dataset loading and preprocessing.
//!
//! # Overview
//!
//! Raw CSV data is loaded into a column-major [`RawTable`], cleaned in place
//! ([`clean`]), encoded, split, and scaled by the [`Preprocessor`]. The
//! fitted transformation state is returned as a [`TransformBundle`] so that
//! inference can apply the exact same mapping.
//!
//! # Missing Values
//!
//! Numeric cells use `f64::NAN`, text cells use `None`. The tokens in
//! [`MISSING_TOKENS`] are read as missing.

use std::path::PathBuf;

pub mod clean;
mod encoder;
mod preprocess;
mod scaler;
pub mod schema;
mod split;
mod table;

pub use encoder::LabelEncoder;
pub use preprocess::{PreparedData, PreprocessingReport, Preprocessor, TransformBundle};
pub use scaler::StandardScaler;
pub use schema::{ColumnKind, BMI_COLUMN, MISSING_TOKENS, TARGET_COLUMN};
pub use split::stratified_split;
pub use table::{Column, ColumnValues, RawTable};

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while loading or preparing a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The dataset file does not exist.
    #[error("dataset not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent (or has the wrong type).
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// A categorical column has no observed value to impute from.
    #[error("column '{0}' has no non-missing values")]
    EmptyColumn(String),

    /// A cell in a numeric column could not be parsed.
    #[error("invalid number '{value}' in column '{column}' at row {row}")]
    InvalidNumber { column: String, row: usize, value: String },

    /// Columns have different lengths.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumn { column: String, expected: usize, actual: usize },

    /// No rows to work with.
    #[error("dataset is empty")]
    Empty,

    /// A class is too small to appear on both sides of a stratified split.
    #[error("class {class} has only {count} member(s); stratified split needs at least 2")]
    InsufficientClassMembers { class: usize, count: usize },
}
