//! Weekly exercise guidance per category.

use serde::Serialize;

use super::ObesityClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Strength,
    Cardio,
    Flexibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Intensity {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Moderate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exercise {
    pub name: &'static str,
    pub kind: ExerciseKind,
    pub duration: &'static str,
    pub intensity: Intensity,
    pub description: &'static str,
}

/// Exercise plan for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExercisePlan {
    pub goal: &'static str,
    pub weekly_target: &'static str,
    pub exercises: &'static [Exercise],
    pub avoid: &'static [&'static str],
    pub tips: &'static [&'static str],
    /// One-line note shown next to the BMI.
    pub bmi_tip: &'static str,
}

pub(super) fn plan(class: ObesityClass) -> &'static ExercisePlan {
    match class {
        ObesityClass::InsufficientWeight => &INSUFFICIENT_WEIGHT,
        ObesityClass::NormalWeight => &NORMAL_WEIGHT,
        ObesityClass::OverweightLevelI => &OVERWEIGHT_LEVEL_I,
        ObesityClass::OverweightLevelII => &OVERWEIGHT_LEVEL_II,
        ObesityClass::ObesityTypeI => &OBESITY_TYPE_I,
        ObesityClass::ObesityTypeII => &OBESITY_TYPE_II,
        ObesityClass::ObesityTypeIII => &OBESITY_TYPE_III,
    }
}

static INSUFFICIENT_WEIGHT: ExercisePlan = ExercisePlan {
    goal: "Build Muscle & Gain Healthy Weight",
    weekly_target: "3-4 days per week",
    exercises: &[
        Exercise {
            name: "Weight Training",
            kind: ExerciseKind::Strength,
            duration: "45 min",
            intensity: Intensity::Moderate,
            description: "Compound movements — squats, deadlifts, bench press",
        },
        Exercise {
            name: "Push-Ups & Pull-Ups",
            kind: ExerciseKind::Strength,
            duration: "15 min",
            intensity: Intensity::Moderate,
            description: "3 sets of 10-12 reps, increase gradually each week",
        },
        Exercise {
            name: "Yoga & Stretching",
            kind: ExerciseKind::Flexibility,
            duration: "20 min",
            intensity: Intensity::Low,
            description: "Morning yoga for flexibility and better posture",
        },
        Exercise {
            name: "Brisk Walking",
            kind: ExerciseKind::Cardio,
            duration: "30 min",
            intensity: Intensity::Low,
            description: "Light cardio without burning excess calories",
        },
    ],
    avoid: &[
        "HIIT and intense cardio",
        "Long-distance running",
        "Skipping meals after workout",
    ],
    tips: &[
        "Eat a protein-rich meal within 30 min of workout",
        "Rest at least 2 days between strength sessions",
        "Track your weight gain progress weekly",
    ],
    bmi_tip: "Your goal is to build lean muscle mass, not gain fat.",
};

static NORMAL_WEIGHT: ExercisePlan = ExercisePlan {
    goal: "Maintain Fitness & Stay Active",
    weekly_target: "4-5 days per week",
    exercises: &[
        Exercise {
            name: "Jogging / Running",
            kind: ExerciseKind::Cardio,
            duration: "30 min",
            intensity: Intensity::Moderate,
            description: "5 km run at a comfortable pace, 3 times per week",
        },
        Exercise {
            name: "Strength Training",
            kind: ExerciseKind::Strength,
            duration: "40 min",
            intensity: Intensity::Moderate,
            description: "Full-body workout twice a week",
        },
        Exercise {
            name: "Cycling",
            kind: ExerciseKind::Cardio,
            duration: "45 min",
            intensity: Intensity::Moderate,
            description: "Outdoor or stationary cycling for endurance",
        },
        Exercise {
            name: "Yoga / Pilates",
            kind: ExerciseKind::Flexibility,
            duration: "30 min",
            intensity: Intensity::Low,
            description: "Core strength, flexibility, and stress relief",
        },
    ],
    avoid: &[
        "Long sedentary periods (more than 2 hours)",
        "Skipping rest days",
        "Over-training without proper recovery",
    ],
    tips: &[
        "Stay active with 10,000 steps daily",
        "Mix cardio and strength for best results",
        "Drink at least 2.5 liters of water per day",
    ],
    bmi_tip: "Focus on maintaining your current healthy weight range.",
};

static OVERWEIGHT_LEVEL_I: ExercisePlan = ExercisePlan {
    goal: "Burn Fat & Improve Cardio Fitness",
    weekly_target: "4-5 days per week",
    exercises: &[
        Exercise {
            name: "Brisk Walking",
            kind: ExerciseKind::Cardio,
            duration: "45 min",
            intensity: Intensity::Moderate,
            description: "Power walking at 5-6 km/h, make it a daily habit",
        },
        Exercise {
            name: "Swimming",
            kind: ExerciseKind::Cardio,
            duration: "30 min",
            intensity: Intensity::Moderate,
            description: "Full-body low-impact exercise, great for fat burn",
        },
        Exercise {
            name: "Bodyweight Circuit",
            kind: ExerciseKind::Strength,
            duration: "25 min",
            intensity: Intensity::Moderate,
            description: "Squats, lunges, and push-ups in timed circuits",
        },
        Exercise {
            name: "Cycling",
            kind: ExerciseKind::Cardio,
            duration: "30 min",
            intensity: Intensity::Moderate,
            description: "Start on flat terrain, gradually increase distance",
        },
    ],
    avoid: &[
        "High-impact jumping exercises in the beginning",
        "Exercising on an empty stomach",
        "Ignoring joint pain signals",
    ],
    tips: &[
        "Start slow and increase intensity each week",
        "Walk after dinner to aid digestion and fat burn",
        "Track your calories with a fitness app",
    ],
    bmi_tip: "Aim to lose 0.5 to 1 kg per week gradually.",
};

static OVERWEIGHT_LEVEL_II: ExercisePlan = ExercisePlan {
    goal: "Steady Weight Loss & Cardiovascular Health",
    weekly_target: "5 days per week",
    exercises: &[
        Exercise {
            name: "Interval Walking",
            kind: ExerciseKind::Cardio,
            duration: "45 min",
            intensity: Intensity::Moderate,
            description: "Alternate 3 min normal walk with 1 min fast walk",
        },
        Exercise {
            name: "Swimming Laps",
            kind: ExerciseKind::Cardio,
            duration: "30 min",
            intensity: Intensity::Moderate,
            description: "Great for joints, burns around 400 calories per hour",
        },
        Exercise {
            name: "Light Strength Training",
            kind: ExerciseKind::Strength,
            duration: "30 min",
            intensity: Intensity::Low,
            description: "Resistance bands and light dumbbells — twice per week",
        },
        Exercise {
            name: "Yoga for Weight Loss",
            kind: ExerciseKind::Flexibility,
            duration: "30 min",
            intensity: Intensity::Low,
            description: "Sun salutations, warrior poses, active flow yoga",
        },
    ],
    avoid: &[
        "Running on hard surfaces (too much joint stress)",
        "Heavy weightlifting without proper form training",
        "High-sugar energy drinks after workout",
    ],
    tips: &[
        "Consistency beats intensity — show up every day",
        "Use stairs instead of elevators daily",
        "Sleep 7-8 hours — poor sleep increases hunger hormones",
    ],
    bmi_tip: "Small daily actions add up to big results over time.",
};

static OBESITY_TYPE_I: ExercisePlan = ExercisePlan {
    goal: "Safe Weight Loss & Joint-Friendly Cardio",
    weekly_target: "5-6 days per week",
    exercises: &[
        Exercise {
            name: "Low-Impact Walking",
            kind: ExerciseKind::Cardio,
            duration: "30 min",
            intensity: Intensity::Low,
            description: "Start with 20 minutes, add 5 minutes each week",
        },
        Exercise {
            name: "Water Aerobics",
            kind: ExerciseKind::Cardio,
            duration: "30 min",
            intensity: Intensity::Low,
            description: "Protects joints while burning calories effectively",
        },
        Exercise {
            name: "Chair Exercises",
            kind: ExerciseKind::Strength,
            duration: "20 min",
            intensity: Intensity::Low,
            description: "Seated leg raises, arm curls, and core tightening",
        },
        Exercise {
            name: "Stationary Cycling",
            kind: ExerciseKind::Cardio,
            duration: "25 min",
            intensity: Intensity::Low,
            description: "Low resistance cycling, easy on the knees",
        },
    ],
    avoid: &[
        "Running and jumping (too much joint stress)",
        "Intense HIIT without medical clearance",
        "Holding breath during any exercise",
    ],
    tips: &[
        "Consult your doctor before starting any routine",
        "Aim for 150 minutes of moderate activity per week",
        "Celebrate every kilogram lost — every step matters",
    ],
    bmi_tip: "Focus on movement, not perfection.",
};

static OBESITY_TYPE_II: ExercisePlan = ExercisePlan {
    goal: "Medical-Grade Exercise for Metabolic Health",
    weekly_target: "5 days per week (start very gradually)",
    exercises: &[
        Exercise {
            name: "Gentle Walking",
            kind: ExerciseKind::Cardio,
            duration: "20 min",
            intensity: Intensity::VeryLow,
            description: "Start at your own pace — every step counts",
        },
        Exercise {
            name: "Pool Walking",
            kind: ExerciseKind::Cardio,
            duration: "25 min",
            intensity: Intensity::Low,
            description: "Walking in waist-deep water reduces joint stress by 60%",
        },
        Exercise {
            name: "Breathing Exercises",
            kind: ExerciseKind::Flexibility,
            duration: "15 min",
            intensity: Intensity::VeryLow,
            description: "Deep breathing and pranayama for stress control",
        },
        Exercise {
            name: "Seated Resistance Band",
            kind: ExerciseKind::Strength,
            duration: "15 min",
            intensity: Intensity::Low,
            description: "Gentle muscle activation from a chair or bed",
        },
    ],
    avoid: &[
        "Any high-impact activity",
        "Exercising in extreme heat",
        "Skipping water during workouts",
    ],
    tips: &[
        "Work with a physiotherapist for a safe routine",
        "Even 2,000 steps per day is a great starting point",
        "Exercise after meals helps control blood sugar levels",
    ],
    bmi_tip: "Safety first — start very slowly and build up gradually.",
};

static OBESITY_TYPE_III: ExercisePlan = ExercisePlan {
    goal: "Supervised Rehabilitation & Improving Mobility",
    weekly_target: "Daily gentle movement (any amount counts)",
    exercises: &[
        Exercise {
            name: "Chair-Based Movement",
            kind: ExerciseKind::Strength,
            duration: "15 min",
            intensity: Intensity::VeryLow,
            description: "Seated arm swings, ankle rolls, and shoulder rolls",
        },
        Exercise {
            name: "Hydrotherapy / Pool",
            kind: ExerciseKind::Cardio,
            duration: "20 min",
            intensity: Intensity::VeryLow,
            description: "Water reduces body weight by up to 90% — safest exercise",
        },
        Exercise {
            name: "Deep Breathing",
            kind: ExerciseKind::Flexibility,
            duration: "10 min",
            intensity: Intensity::VeryLow,
            description: "Controlled breathing for lung health and relaxation",
        },
        Exercise {
            name: "Short Walks",
            kind: ExerciseKind::Cardio,
            duration: "10 min",
            intensity: Intensity::VeryLow,
            description: "2-3 short walks daily improve blood circulation",
        },
    ],
    avoid: &[
        "Any unsupervised exercise",
        "Weight-bearing high-impact activity",
        "Exercising without medical clearance",
    ],
    tips: &[
        "Work with a doctor, physiotherapist, and dietitian together",
        "Focus on reducing sitting/lying time first",
        "Bed-based exercises are completely valid starting points",
    ],
    bmi_tip: "Every movement matters — your journey starts with one step.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heaviest_classes_stay_low_intensity() {
        for class in [ObesityClass::ObesityTypeII, ObesityClass::ObesityTypeIII] {
            assert!(plan(class).exercises.iter().all(|e| e.intensity <= Intensity::Low));
        }
    }
}
