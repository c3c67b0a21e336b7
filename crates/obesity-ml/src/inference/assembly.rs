//! Rebuilding the full training feature vector from the six user inputs.
//!
//! Only six of the seventeen model features are collected. The remaining
//! columns are filled with fixed, already-encoded constants that reflect the
//! most common (or average) answers in the training data. They are part of
//! the model design and are not recomputed from data.

use std::collections::HashMap;

use super::input::PatientInput;
use super::PredictError;
use crate::data::clean::bmi;
use crate::data::TransformBundle;

/// Encoded values for the features the user is not asked about.
pub const DEFAULT_FILLS: [(&str, f64); 10] = [
    ("FAVC", 1.0),
    ("FCVC", 2.0),
    ("NCP", 3.0),
    ("CAEC", 2.0),
    ("SMOKE", 0.0),
    ("CH2O", 2.0),
    ("SCC", 0.0),
    ("TUE", 1.0),
    ("CALC", 0.0),
    ("MTRANS", 1.0),
];

const GENDER: &str = "Gender";
const FAMILY_HISTORY: &str = "family_history_with_overweight";

/// What to do with a feature column that has no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssemblyMode {
    /// Fill with `0.0` and log a warning.
    #[default]
    Lenient,
    /// Fail with [`PredictError::MissingFeature`].
    Strict,
}

/// Builds model-order feature rows against a fitted [`TransformBundle`].
#[derive(Debug, Clone, Copy)]
pub struct FeatureAssembler<'a> {
    transform: &'a TransformBundle,
    mode: AssemblyMode,
}

impl<'a> FeatureAssembler<'a> {
    pub fn new(transform: &'a TransformBundle, mode: AssemblyMode) -> Self {
        Self { transform, mode }
    }

    /// Encode a categorical input with the persisted encoder.
    fn encode(&self, column: &'static str, value: &str) -> Result<f64, PredictError> {
        let encoder = self
            .transform
            .encoder(column)
            .ok_or_else(|| PredictError::Prediction(format!("model has no encoder for '{column}'")))?;
        encoder
            .encode(value)
            .map(|code| code as f64)
            .ok_or_else(|| PredictError::UnknownCategory { column: column.to_string(), value: value.to_string() })
    }

    /// Every feature value derivable from the input, keyed by column name.
    pub fn named_values(&self, input: &PatientInput) -> Result<HashMap<&'static str, f64>, PredictError> {
        let height_m = input.height_m();
        let mut values = HashMap::from([
            (GENDER, self.encode(GENDER, &input.gender)?),
            ("Age", f64::from(input.age)),
            ("Height", height_m),
            ("Weight", input.weight_kg),
            (FAMILY_HISTORY, self.encode(FAMILY_HISTORY, &input.family_history.to_lowercase())?),
            ("FAF", input.activity().frequency()),
            ("BMI", bmi(input.weight_kg, height_m)),
        ]);
        values.extend(DEFAULT_FILLS);
        Ok(values)
    }

    /// The unscaled feature row in training column order.
    pub fn assemble(&self, input: &PatientInput) -> Result<Vec<f64>, PredictError> {
        let values = self.named_values(input)?;
        self.transform
            .feature_columns
            .iter()
            .map(|name| match (values.get(name.as_str()), self.mode) {
                (Some(&v), _) => Ok(v),
                (None, AssemblyMode::Lenient) => {
                    tracing::warn!(column = %name, "no value for feature column, using 0.0");
                    Ok(0.0)
                }
                (None, AssemblyMode::Strict) => Err(PredictError::MissingFeature(name.clone())),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LabelEncoder, StandardScaler};
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;
    use std::collections::BTreeMap;

    fn transform(columns: &[&str]) -> TransformBundle {
        TransformBundle {
            scaler: StandardScaler::fit(Array2::<f64>::zeros((2, columns.len())).view()),
            feature_encoders: BTreeMap::from([
                (GENDER.to_string(), LabelEncoder::fit(["Female", "Male"])),
                (FAMILY_HISTORY.to_string(), LabelEncoder::fit(["no", "yes"])),
            ]),
            target_encoder: LabelEncoder::fit(["Normal_Weight", "Obesity_Type_I"]),
            feature_columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn input() -> PatientInput {
        PatientInput::new(35, "Male", 175.0, 95.0, "Sedentary", "Yes")
    }

    #[test]
    fn follows_training_column_order() {
        let t = transform(&["BMI", "Gender", "family_history_with_overweight", "FAF", "Height", "MTRANS", "Age"]);
        let row = FeatureAssembler::new(&t, AssemblyMode::Strict).assemble(&input()).unwrap();
        assert_abs_diff_eq!(row[0], 95.0 / (1.75 * 1.75), epsilon = 1e-12);
        assert_eq!(&row[1..], &[1.0, 1.0, 0.0, 1.75, 1.0, 35.0]);
    }

    #[test]
    fn unknown_columns_depend_on_mode() {
        let t = transform(&["Age", "Mystery"]);
        let lenient = FeatureAssembler::new(&t, AssemblyMode::Lenient).assemble(&input()).unwrap();
        assert_eq!(lenient, vec![35.0, 0.0]);

        let strict = FeatureAssembler::new(&t, AssemblyMode::Strict).assemble(&input());
        assert!(matches!(strict, Err(PredictError::MissingFeature(name)) if name == "Mystery"));
    }

    #[test]
    fn unseen_gender_is_rejected() {
        let t = transform(&["Gender"]);
        let mut other = input();
        other.gender = "Other".into();
        let err = FeatureAssembler::new(&t, AssemblyMode::Lenient).assemble(&other).unwrap_err();
        assert!(matches!(err, PredictError::UnknownCategory { ref column, ref value } if column == "Gender" && value == "Other"));
    }

    #[test]
    fn gender_is_case_sensitive_family_history_is_not() {
        let t = transform(&["Gender", "family_history_with_overweight"]);
        let mut shouting = input();
        shouting.family_history = "NO".into();
        let row = FeatureAssembler::new(&t, AssemblyMode::Strict).assemble(&shouting).unwrap();
        assert_eq!(row, vec![1.0, 0.0]);

        shouting.gender = "male".into();
        assert!(FeatureAssembler::new(&t, AssemblyMode::Strict).assemble(&shouting).is_err());
    }

    #[test]
    fn every_default_fill_is_used() {
        let names: Vec<&str> = DEFAULT_FILLS.iter().map(|(n, _)| *n).collect();
        let t = transform(&names);
        let row = FeatureAssembler::new(&t, AssemblyMode::Strict).assemble(&input()).unwrap();
        assert_eq!(row, DEFAULT_FILLS.iter().map(|(_, v)| *v).collect::<Vec<_>>());
    }
}
