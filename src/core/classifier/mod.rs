use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;

pub use forest::{ForestSpec, RandomForest};
pub use prediction::{PartialPrediction, Prediction};
pub use tree::{DecisionTree, TreeSpec};

use crate::core::error::Result;
use crate::core::features::{FeatureSet, FeatureVector};

mod forest;
mod prediction;
mod tree;

/// Ensemble with a decision threshold: pathogenic iff probability > threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdedClassifier {
    name: String,
    forest: RandomForest,
    threshold: f64,
}

impl ThresholdedClassifier {
    pub fn new(name: &str, forest: RandomForest, threshold: f64) -> Self {
        Self { name: name.to_string(), forest, threshold }
    }

    pub fn from_spec(name: &str, spec: &ForestSpec) -> Result<Self> {
        Ok(Self::new(name, RandomForest::from_spec(spec)?, spec.threshold))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[inline]
    pub fn features(&self) -> &FeatureSet {
        self.forest.features()
    }

    pub fn predict(&self, features: &FeatureVector) -> PartialPrediction {
        PartialPrediction::new(self.name.clone(), self.forest.predict_proba(features), self.threshold)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ClassifierSpec {
    pub donor: ForestSpec,
    pub acceptor: ForestSpec,
}

/// Donor and acceptor sub-models combined into a single prediction.
#[derive(Debug)]
pub struct SquirlsClassifier {
    donor: ThresholdedClassifier,
    acceptor: ThresholdedClassifier,
    required: FeatureSet,
    warned: AtomicBool,
}

impl SquirlsClassifier {
    pub fn new(donor: ThresholdedClassifier, acceptor: ThresholdedClassifier) -> Self {
        let required = donor.features().iter().chain(acceptor.features().iter()).collect();
        Self { donor, acceptor, required, warned: AtomicBool::new(false) }
    }

    pub fn from_spec(spec: &ClassifierSpec) -> Result<Self> {
        Ok(Self::new(
            ThresholdedClassifier::from_spec("donor", &spec.donor)?,
            ThresholdedClassifier::from_spec("acceptor", &spec.acceptor)?,
        ))
    }

    /// Features both sub-models need.
    #[inline]
    pub fn required(&self) -> &FeatureSet {
        &self.required
    }

    /// Incomplete feature vectors produce an empty prediction, this is reported once per classifier.
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let missing = features.missing(&self.required);
        if !missing.is_empty() {
            if !features.is_empty() && !self.warned.swap(true, Ordering::Relaxed) {
                let names: Vec<&str> = missing.iter().map(|x| x.name()).collect();
                log::warn!("Features required by the classifier are missing: {}", names.join(", "));
            }
            return Prediction::empty();
        }
        Prediction::new(vec![self.donor.predict(features), self.acceptor.predict(features)])
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::core::features::Feature;

    use super::tree::tests::spec;
    use super::*;

    /// Donor and acceptor models sharing the toy tree over cryptic_donor and phylop.
    pub fn classifier() -> SquirlsClassifier {
        let forest = |threshold| ForestSpec {
            threshold,
            features: vec!["cryptic_donor".into(), "phylop".into()],
            trees: vec![spec()],
        };
        SquirlsClassifier::from_spec(&ClassifierSpec { donor: forest(0.5), acceptor: forest(0.9) }).unwrap()
    }

    #[test]
    fn predict() {
        let classifier = classifier();
        let mut features = FeatureVector::default();
        features.set(Feature::CrypticDonor, 0.0);
        features.set(Feature::Phylop, 1.0);

        let prediction = classifier.predict(&features);
        assert_eq!(prediction.partials().len(), 2);
        assert_eq!(prediction.partials()[0], PartialPrediction::new("donor".into(), 1.0, 0.5));
        assert_eq!(prediction.partials()[1], PartialPrediction::new("acceptor".into(), 1.0, 0.9));
        assert!(prediction.is_positive());
        assert_eq!(prediction.max_pathogenicity(), 1.0);

        features.set(Feature::Phylop, -1.0);
        let prediction = classifier.predict(&features);
        assert!(!prediction.is_positive());
        assert_eq!(prediction.max_pathogenicity(), 0.2);
    }

    #[test]
    fn missing_feature() {
        let classifier = classifier();
        let mut features = FeatureVector::default();
        features.set(Feature::CrypticDonor, 0.0);
        features.set(Feature::Hexamer, 1.0);

        for _ in 0..3 {
            let prediction = classifier.predict(&features);
            assert!(prediction.is_empty());
            assert!(!prediction.is_positive());
            assert_eq!(prediction.partials().len(), 0);
        }
        assert!(classifier.warned.load(Ordering::Relaxed));

        // NaN is a value, not a missing feature
        features.set(Feature::Phylop, f64::NAN);
        assert!(!classifier.predict(&features).is_empty());
    }

    #[test]
    fn required() {
        assert_eq!(classifier().required(), &FeatureSet::empty().with(&[Feature::CrypticDonor, Feature::Phylop]));
    }
}
