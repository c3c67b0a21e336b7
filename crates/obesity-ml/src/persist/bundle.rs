//! The serving bundle: everything inference needs in one artifact.

use serde::{Deserialize, Serialize};

use super::codec::SCHEMA_VERSION;
use super::PersistError;
use crate::data::TransformBundle;
use crate::repr::{Forest, LeafValue};
use crate::training::{Classifier, FittedModel, ModelStats, SoftVotingEnsemble};

/// Descriptive metadata stored alongside the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub num_features: usize,
    pub num_classes: usize,
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
}

/// Ensemble + transform state + feature order + evaluation stats.
///
/// Immutable once written. Loaded once per process by the inference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingBundle {
    pub schema_version: u16,
    pub meta: ModelMeta,
    pub ensemble: SoftVotingEnsemble,
    pub transform: TransformBundle,
    pub stats: ModelStats,
}

impl ServingBundle {
    pub fn new(ensemble: SoftVotingEnsemble, transform: TransformBundle, stats: ModelStats) -> Self {
        let meta = ModelMeta {
            num_features: transform.n_features(),
            num_classes: transform.class_names().len(),
            feature_names: transform.feature_columns.clone(),
            class_names: transform.class_names().to_vec(),
        };
        Self { schema_version: SCHEMA_VERSION, meta, ensemble, transform, stats }
    }

    /// Check that the parts of the bundle agree with each other and every
    /// tree is structurally sound.
    pub fn validate(&self) -> Result<(), PersistError> {
        let invalid = |reason: String| Err(PersistError::InvalidModel(reason));

        if self.schema_version != SCHEMA_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: self.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        let n_features = self.transform.n_features();
        let n_classes = self.transform.class_names().len();
        if self.transform.scaler.n_features() != n_features {
            return invalid(format!(
                "scaler has {} features, feature order has {n_features}",
                self.transform.scaler.n_features()
            ));
        }
        if self.ensemble.members().is_empty() {
            return invalid("ensemble has no members".into());
        }
        if self.ensemble.n_features() != n_features || self.ensemble.n_classes() != n_classes {
            return invalid(format!(
                "ensemble expects {} features / {} classes, transform provides {n_features} / {n_classes}",
                self.ensemble.n_features(),
                self.ensemble.n_classes()
            ));
        }
        for member in self.ensemble.members() {
            let result = if member.n_features() != n_features || member.n_classes() != n_classes {
                Err(format!("shape {} x {} does not match the ensemble", member.n_features(), member.n_classes()))
            } else {
                match member {
                    FittedModel::RandomForest(m) => check_forest(m.forest(), n_features),
                    FittedModel::Boosting(m) => check_forest(m.forest(), n_features),
                    FittedModel::Logistic(m) if m.weights().dim() != (n_features, m.bias().len()) => Err(format!(
                        "weights are {:?} for {n_features} features and {} classes",
                        m.weights().dim(),
                        m.bias().len()
                    )),
                    FittedModel::Logistic(_) => Ok(()),
                }
            };
            if let Err(reason) = result {
                return invalid(format!("{}: {reason}", member.name()));
            }
        }
        Ok(())
    }
}

/// Structural checks plus split features within the input width.
fn check_forest<L: LeafValue>(forest: &Forest<L>, n_features: usize) -> Result<(), String> {
    forest.validate().map_err(|e| format!("{e:?}"))?;
    match forest.max_split_index() {
        Some(index) if index as usize >= n_features => {
            Err(format!("split on feature {index}, input has {n_features}"))
        }
        _ => Ok(()),
    }
}
