//! User-facing prediction inputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PredictError;

/// Self-reported physical activity, mapped onto the `FAF` frequency scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    #[serde(rename = "Very Active")]
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] =
        [Self::Sedentary, Self::Light, Self::Moderate, Self::Active, Self::VeryActive];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sedentary => "Sedentary",
            Self::Light => "Light",
            Self::Moderate => "Moderate",
            Self::Active => "Active",
            Self::VeryActive => "Very Active",
        }
    }

    /// Physical activity frequency on the dataset's 0-3 scale.
    pub fn frequency(self) -> f64 {
        match self {
            Self::Sedentary => 0.0,
            Self::Light => 0.75,
            Self::Moderate => 1.5,
            Self::Active => 2.25,
            Self::VeryActive => 3.0,
        }
    }

    /// Parse a label, falling back to [`ActivityLevel::Moderate`] for
    /// anything unrecognized.
    pub fn from_label_or_default(label: &str) -> Self {
        label.parse().unwrap_or_else(|_| {
            tracing::debug!(label, "unrecognized activity level, using Moderate");
            Self::default()
        })
    }
}

impl FromStr for ActivityLevel {
    type Err = PredictError;

    /// Exact labels only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.label() == s)
            .ok_or_else(|| PredictError::InvalidInput(format!("unknown activity level '{s}'")))
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The six inputs collected from a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    /// Age in whole years.
    pub age: u32,
    /// Matched verbatim against the training vocabulary (`Female`, `Male`).
    pub gender: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// One of the [`ActivityLevel`] labels. Anything else counts as `Moderate`.
    pub activity_level: String,
    /// `Yes` or `No`, case-insensitive.
    pub family_history: String,
}

impl PatientInput {
    pub fn new(
        age: u32,
        gender: impl Into<String>,
        height_cm: f64,
        weight_kg: f64,
        activity_level: impl Into<String>,
        family_history: impl Into<String>,
    ) -> Self {
        Self {
            age,
            gender: gender.into(),
            height_cm,
            weight_kg,
            activity_level: activity_level.into(),
            family_history: family_history.into(),
        }
    }

    /// Reject non-positive or non-finite measurements.
    pub fn validate(&self) -> Result<(), PredictError> {
        if self.age == 0 {
            return Err(PredictError::InvalidInput("age must be positive".into()));
        }
        for (name, value) in [("height_cm", self.height_cm), ("weight_kg", self.weight_kg)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PredictError::InvalidInput(format!("{name} must be a positive number, got {value}")));
            }
        }
        Ok(())
    }

    pub fn height_m(&self) -> f64 {
        self.height_cm / 100.0
    }

    pub fn activity(&self) -> ActivityLevel {
        ActivityLevel::from_label_or_default(&self.activity_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Sedentary", 0.0)]
    #[case("Light", 0.75)]
    #[case("Moderate", 1.5)]
    #[case("Active", 2.25)]
    #[case("Very Active", 3.0)]
    #[case("Marathoner", 1.5)]
    #[case("sedentary", 1.5)]
    fn activity_frequency(#[case] label: &str, #[case] expected: f64) {
        assert_eq!(ActivityLevel::from_label_or_default(label).frequency(), expected);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        assert_eq!("Very Active".parse::<ActivityLevel>().unwrap(), ActivityLevel::VeryActive);
        assert!(matches!("Marathoner".parse::<ActivityLevel>(), Err(PredictError::InvalidInput(_))));
    }

    #[rstest]
    #[case(0, 175.0, 80.0)]
    #[case(30, 0.0, 80.0)]
    #[case(30, 175.0, -1.0)]
    #[case(30, f64::NAN, 80.0)]
    fn invalid_measurements(#[case] age: u32, #[case] height: f64, #[case] weight: f64) {
        let input = PatientInput::new(age, "Male", height, weight, "Light", "yes");
        assert!(matches!(input.validate(), Err(PredictError::InvalidInput(_))));
    }

    #[test]
    fn deserializes_from_json() {
        let input: PatientInput = serde_json::from_str(
            r#"{"age": 35, "gender": "Male", "height_cm": 175, "weight_kg": 95,
                "activity_level": "Sedentary", "family_history": "Yes"}"#,
        )
        .unwrap();
        assert_eq!(input.activity(), ActivityLevel::Sedentary);
        assert!((input.height_m() - 1.75).abs() < 1e-12);
    }
}
