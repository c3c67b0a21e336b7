//! Column definitions for the obesity dataset.
//!
//! This module names the raw columns and describes how each one is
//! interpreted during loading and preprocessing.

use serde::{Deserialize, Serialize};

/// Target column holding the obesity category label.
pub const TARGET_COLUMN: &str = "NObeyesdad";

/// Name of the derived Body Mass Index column.
pub const BMI_COLUMN: &str = "BMI";

/// Categorical (text) columns, imputed with the mode and label-encoded.
pub const CATEGORICAL_COLUMNS: [&str; 8] = [
    "Gender",
    "family_history_with_overweight",
    "FAVC",
    "CAEC",
    "SMOKE",
    "SCC",
    "CALC",
    "MTRANS",
];

/// Numeric columns, imputed with the mean and outlier-capped.
pub const NUMERIC_COLUMNS: [&str; 8] = ["Age", "Height", "Weight", "FCVC", "NCP", "CH2O", "FAF", "TUE"];

/// Column holding height in metres.
pub const HEIGHT_COLUMN: &str = "Height";

/// Column holding weight in kilograms.
pub const WEIGHT_COLUMN: &str = "Weight";

/// Logical column kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// One of the known numeric measures. Imputed and outlier-capped.
    Numeric,
    /// One of the known categorical columns. Imputed with the mode and encoded.
    Categorical,
    /// The label column.
    Target,
    /// A column outside the known schema, carried through as a plain number.
    Passthrough,
}

impl ColumnKind {
    /// Classify a column by name.
    pub fn of(name: &str) -> Self {
        if name == TARGET_COLUMN {
            ColumnKind::Target
        } else if CATEGORICAL_COLUMNS.contains(&name) {
            ColumnKind::Categorical
        } else if NUMERIC_COLUMNS.contains(&name) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Passthrough
        }
    }

    /// Returns true if values of this kind are stored as text.
    #[inline]
    pub fn is_textual(self) -> bool {
        matches!(self, ColumnKind::Categorical | ColumnKind::Target)
    }
}

/// Tokens read as a missing value.
pub const MISSING_TOKENS: [&str; 6] = ["", "NA", "NaN", "nan", "null", "NULL"];

/// Returns true if a raw cell denotes a missing value.
#[inline]
pub fn is_missing_token(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw.trim())
}
