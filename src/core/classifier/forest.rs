use serde::Deserialize;

use crate::core::error::{Result, SquirlsError};
use crate::core::features::{Feature, FeatureSet, FeatureVector};

use super::tree::{DecisionTree, TreeSpec};

/// Serialized ensemble with its decision threshold.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ForestSpec {
    pub threshold: f64,
    pub features: Vec<String>,
    pub trees: Vec<TreeSpec>,
}

/// Ensemble of decision trees. Probabilities are averaged, there is no voting.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    features: FeatureSet,
}

impl RandomForest {
    pub fn new(trees: Vec<DecisionTree>, features: FeatureSet) -> Result<Self> {
        if trees.is_empty() {
            return Err(SquirlsError::InvalidTree("ensemble must contain at least one tree".into()));
        }
        Ok(Self { trees, features })
    }

    pub fn from_spec(spec: &ForestSpec) -> Result<Self> {
        let names = spec.features.iter().map(|x| x.parse::<Feature>()).collect::<Result<Vec<_>>>()?;
        let trees = spec.trees.iter().map(|x| DecisionTree::new(x, &names)).collect::<Result<Vec<_>>>()?;
        Self::new(trees, names.into_iter().collect())
    }

    /// Features the trees were trained on.
    #[inline]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn predict_proba(&self, features: &FeatureVector) -> f64 {
        let total: f64 = self.trees.iter().map(|x| x.predict_proba(features)).sum();
        total / self.trees.len() as f64
    }
}
