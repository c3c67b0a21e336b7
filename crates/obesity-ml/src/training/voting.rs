//! Soft-voting ensemble over heterogeneous fitted models.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::boosting::BoostingModel;
use super::classifier::Classifier;
use super::forest::RandomForestModel;
use super::linear::LogisticModel;
use super::TrainError;

/// Any of the fitted model families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedModel {
    RandomForest(RandomForestModel),
    Logistic(LogisticModel),
    Boosting(BoostingModel),
}

impl FittedModel {
    /// Short model name used in logs and artifact names.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RandomForest(_) => "random_forest",
            Self::Logistic(_) => "logistic_regression",
            Self::Boosting(_) => "gradient_boosting",
        }
    }

    fn as_classifier(&self) -> &dyn Classifier {
        match self {
            Self::RandomForest(m) => m,
            Self::Logistic(m) => m,
            Self::Boosting(m) => m,
        }
    }
}

impl From<RandomForestModel> for FittedModel {
    fn from(model: RandomForestModel) -> Self {
        Self::RandomForest(model)
    }
}

impl From<LogisticModel> for FittedModel {
    fn from(model: LogisticModel) -> Self {
        Self::Logistic(model)
    }
}

impl From<BoostingModel> for FittedModel {
    fn from(model: BoostingModel) -> Self {
        Self::Boosting(model)
    }
}

impl Classifier for FittedModel {
    fn n_classes(&self) -> usize {
        self.as_classifier().n_classes()
    }

    fn n_features(&self) -> usize {
        self.as_classifier().n_features()
    }

    fn predict_proba(&self, features: ArrayView2<f64>) -> Array2<f64> {
        self.as_classifier().predict_proba(features)
    }
}

/// Equal-weight average of member probabilities.
///
/// Members must agree on class count and feature count; [`SoftVotingEnsemble::new`]
/// checks this once so prediction never has to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftVotingEnsemble {
    members: Vec<FittedModel>,
}

impl SoftVotingEnsemble {
    /// # Errors
    ///
    /// [`TrainError::ShapeMismatch`] if the members disagree on classes or
    /// features, [`TrainError::FitFailure`] if there are none.
    pub fn new(members: Vec<FittedModel>) -> Result<Self, TrainError> {
        let Some(first) = members.first() else {
            return Err(TrainError::FitFailure { model: "ensemble", reason: "no members".into() });
        };
        let (n_classes, n_features) = (first.n_classes(), first.n_features());
        for member in &members[1..] {
            if member.n_classes() != n_classes {
                return Err(TrainError::ShapeMismatch { expected: n_classes, actual: member.n_classes() });
            }
            if member.n_features() != n_features {
                return Err(TrainError::ShapeMismatch { expected: n_features, actual: member.n_features() });
            }
        }
        Ok(Self { members })
    }

    pub fn members(&self) -> &[FittedModel] {
        &self.members
    }
}

impl Classifier for SoftVotingEnsemble {
    fn n_classes(&self) -> usize {
        self.members[0].n_classes()
    }

    fn n_features(&self) -> usize {
        self.members[0].n_features()
    }

    fn predict_proba(&self, features: ArrayView2<f64>) -> Array2<f64> {
        let mut total = Array2::zeros((features.nrows(), self.n_classes()));
        for member in &self.members {
            total += &member.predict_proba(features);
        }
        total /= self.members.len() as f64;
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::data::blobs;
    use crate::training::{BoostingConfig, Estimator, ForestConfig, LogisticConfig};
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;

    #[test]
    fn averages_member_probabilities() {
        let (x, y) = blobs(60, 3, 3, 11);
        let rf: FittedModel = ForestConfig::builder().n_trees(5).build().unwrap().fit(x.view(), y.view(), 3).unwrap().into();
        let lr: FittedModel = LogisticConfig::default().fit(x.view(), y.view(), 3).unwrap().into();
        let gb: FittedModel =
            BoostingConfig::builder().n_rounds(5).build().unwrap().fit(x.view(), y.view(), 3).unwrap().into();

        let expected = (rf.predict_proba(x.view()) + lr.predict_proba(x.view()) + gb.predict_proba(x.view())) / 3.0;
        let ensemble = SoftVotingEnsemble::new(vec![rf, lr, gb]).unwrap();
        let got = ensemble.predict_proba(x.view());
        for (a, b) in got.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
        let sums: Array1<f64> = got.sum_axis(ndarray::Axis(1));
        assert!(sums.iter().all(|s| (s - 1.0).abs() < 1e-9));
        assert_eq!(ensemble.members()[1].name(), "logistic_regression");
    }

    #[test]
    fn rejects_mismatched_members() {
        let (x3, y3) = blobs(30, 3, 2, 1);
        let (x2, y2) = blobs(30, 2, 2, 1);
        let a: FittedModel = LogisticConfig::default().fit(x3.view(), y3.view(), 3).unwrap().into();
        let b: FittedModel = LogisticConfig::default().fit(x2.view(), y2.view(), 2).unwrap().into();
        assert!(matches!(
            SoftVotingEnsemble::new(vec![a, b]),
            Err(TrainError::ShapeMismatch { expected: 3, actual: 2 })
        ));
        assert!(SoftVotingEnsemble::new(vec![]).is_err());
    }
}
