//! Static nutrition and exercise guidance per obesity category.
//!
//! Every [`ObesityClass`] maps to one [`NutritionPlan`] and one
//! [`ExercisePlan`]. Lookups by string key fall back to
//! [`ObesityClass::NormalWeight`] for unknown keys.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

mod exercise;
mod nutrition;

pub use exercise::{Exercise, ExerciseKind, ExercisePlan, Intensity};
pub use nutrition::NutritionPlan;

/// The seven obesity categories of the target vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ObesityClass {
    #[serde(rename = "Insufficient_Weight")]
    InsufficientWeight,
    #[serde(rename = "Normal_Weight")]
    NormalWeight,
    #[serde(rename = "Overweight_Level_I")]
    OverweightLevelI,
    #[serde(rename = "Overweight_Level_II")]
    OverweightLevelII,
    #[serde(rename = "Obesity_Type_I")]
    ObesityTypeI,
    #[serde(rename = "Obesity_Type_II")]
    ObesityTypeII,
    #[serde(rename = "Obesity_Type_III")]
    ObesityTypeIII,
}

/// Unrecognized category key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown obesity class '{0}'")]
pub struct UnknownClass(pub String);

impl ObesityClass {
    /// Every category, from lightest to heaviest.
    pub const ALL: [ObesityClass; 7] = [
        Self::InsufficientWeight,
        Self::NormalWeight,
        Self::OverweightLevelI,
        Self::OverweightLevelII,
        Self::ObesityTypeI,
        Self::ObesityTypeII,
        Self::ObesityTypeIII,
    ];

    /// Key as used in the dataset's target column.
    pub fn as_key(self) -> &'static str {
        match self {
            Self::InsufficientWeight => "Insufficient_Weight",
            Self::NormalWeight => "Normal_Weight",
            Self::OverweightLevelI => "Overweight_Level_I",
            Self::OverweightLevelII => "Overweight_Level_II",
            Self::ObesityTypeI => "Obesity_Type_I",
            Self::ObesityTypeII => "Obesity_Type_II",
            Self::ObesityTypeIII => "Obesity_Type_III",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        self.nutrition_plan().label
    }

    /// Parse a key, falling back to `NormalWeight`.
    pub fn from_key_or_default(key: &str) -> Self {
        key.parse().unwrap_or(Self::NormalWeight)
    }

    pub fn nutrition_plan(self) -> &'static NutritionPlan {
        nutrition::plan(self)
    }

    pub fn exercise_plan(self) -> &'static ExercisePlan {
        exercise::plan(self)
    }
}

impl FromStr for ObesityClass {
    type Err = UnknownClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_key() == s)
            .ok_or_else(|| UnknownClass(s.to_string()))
    }
}

impl fmt::Display for ObesityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Both plans for one category.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CarePlan {
    pub class: ObesityClass,
    pub nutrition: &'static NutritionPlan,
    pub exercise: &'static ExercisePlan,
}

impl CarePlan {
    pub fn for_class(class: ObesityClass) -> Self {
        Self { class, nutrition: class.nutrition_plan(), exercise: class.exercise_plan() }
    }

    /// Plans for a class key; unknown keys get the `Normal_Weight` plans.
    pub fn lookup(key: &str) -> Self {
        Self::for_class(ObesityClass::from_key_or_default(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn keys_roundtrip() {
        for class in ObesityClass::ALL {
            assert_eq!(class.as_key().parse::<ObesityClass>().unwrap(), class);
        }
    }

    #[test]
    fn keys_match_sorted_target_vocabulary() {
        let mut keys: Vec<&str> = ObesityClass::ALL.iter().map(|c| c.as_key()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "Insufficient_Weight",
                "Normal_Weight",
                "Obesity_Type_I",
                "Obesity_Type_II",
                "Obesity_Type_III",
                "Overweight_Level_I",
                "Overweight_Level_II",
            ]
        );
    }

    #[rstest]
    #[case("Obesity_Type_III", ObesityClass::ObesityTypeIII)]
    #[case("obesity_type_iii", ObesityClass::NormalWeight)]
    #[case("", ObesityClass::NormalWeight)]
    fn unknown_keys_fall_back(#[case] key: &str, #[case] expected: ObesityClass) {
        assert_eq!(CarePlan::lookup(key).class, expected);
    }

    #[test]
    fn calories_decrease_with_weight_class() {
        let calories: Vec<u32> = ObesityClass::ALL.iter().map(|c| c.nutrition_plan().daily_calories).collect();
        assert_eq!(calories, vec![2500, 2000, 1800, 1700, 1600, 1500, 1400]);
    }

    #[test]
    fn every_plan_is_complete() {
        for class in ObesityClass::ALL {
            let plan = CarePlan::for_class(class);
            assert!(!plan.nutrition.breakfast.is_empty() && !plan.nutrition.tips.is_empty());
            assert_eq!(plan.exercise.exercises.len(), 4, "{class}");
            assert!(!plan.exercise.bmi_tip.is_empty());
        }
    }

    #[test]
    fn plan_serializes_to_json() {
        let json = serde_json::to_value(CarePlan::lookup("Overweight_Level_I")).unwrap();
        assert_eq!(json["class"], "Overweight_Level_I");
        assert_eq!(json["nutrition"]["daily_calories"], 1800);
        assert_eq!(json["exercise"]["exercises"][0]["kind"], "cardio");
    }
}
