use serde::Deserialize;

use crate::core::error::{Result, SquirlsError};
use crate::core::features::{Feature, FeatureVector};

const LEAF: i64 = -1;

/// Decision tree in the flat array layout: node `i` is a leaf iff both of its children are -1.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TreeSpec {
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    /// Class counts (negative, positive) per node.
    pub value: Vec<Vec<f64>>,
}

#[derive(Clone, Debug, PartialEq)]
enum Node {
    Split { feature: Feature, threshold: f64, left: usize, right: usize },
    Leaf { probability: f64 },
}

/// Binary decision tree returning the positive class probability.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// `features` maps the tree feature indices to feature names.
    pub fn new(spec: &TreeSpec, features: &[Feature]) -> Result<Self> {
        let size = spec.feature.len();
        if size == 0 {
            return Err(SquirlsError::InvalidTree("tree has no nodes".into()));
        }
        for (name, len) in [
            ("threshold", spec.threshold.len()),
            ("children_left", spec.children_left.len()),
            ("children_right", spec.children_right.len()),
            ("value", spec.value.len()),
        ] {
            if len != size {
                return Err(SquirlsError::InvalidTree(format!("{} has {} entries, expected {}", name, len, size)));
            }
        }

        let mut nodes = Vec::with_capacity(size);
        for ind in 0..size {
            let (left, right) = (spec.children_left[ind], spec.children_right[ind]);
            let node = match (left, right) {
                (LEAF, LEAF) => {
                    let counts = &spec.value[ind];
                    if counts.len() != 2 {
                        return Err(SquirlsError::InvalidTree(format!(
                            "leaf {} has {} class counts, expected 2",
                            ind,
                            counts.len()
                        )));
                    }
                    let total = counts[0] + counts[1];
                    if !(total > 0.0) || counts.iter().any(|x| *x < 0.0) {
                        return Err(SquirlsError::InvalidTree(format!("leaf {} has invalid counts {:?}", ind, counts)));
                    }
                    Node::Leaf { probability: counts[1] / total }
                }
                (LEAF, _) | (_, LEAF) => {
                    return Err(SquirlsError::InvalidTree(format!("node {} has a single child", ind)));
                }
                (left, right) => {
                    let valid = |child: i64| child > ind as i64 && (child as usize) < size;
                    if !valid(left) || !valid(right) {
                        return Err(SquirlsError::InvalidTree(format!(
                            "node {} has invalid children {} and {}",
                            ind, left, right
                        )));
                    }
                    let feature = usize::try_from(spec.feature[ind])
                        .ok()
                        .and_then(|x| features.get(x))
                        .copied()
                        .ok_or_else(|| {
                            SquirlsError::InvalidTree(format!(
                                "node {} refers to the unknown feature index {}",
                                ind, spec.feature[ind]
                            ))
                        })?;
                    Node::Split { feature, threshold: spec.threshold[ind], left: left as usize, right: right as usize }
                }
            };
            nodes.push(node);
        }
        Ok(Self { nodes })
    }

    /// Follows `value <= threshold` to the left child. NaN and missing values go right.
    pub fn predict_proba(&self, features: &FeatureVector) -> f64 {
        let mut ind = 0;
        loop {
            match &self.nodes[ind] {
                Node::Leaf { probability } => return *probability,
                Node::Split { feature, threshold, left, right } => {
                    let value = features.get(*feature).unwrap_or(f64::NAN);
                    ind = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    //            0: cryptic_donor <= 1.5
    //           /                      \
    //   1: phylop <= 0.0            2: leaf [1, 3]
    //   /            \
    // 3: [8, 2]   4: [0, 5]
    pub fn spec() -> TreeSpec {
        TreeSpec {
            feature: vec![0, 1, -2, -2, -2],
            threshold: vec![1.5, 0.0, -2.0, -2.0, -2.0],
            children_left: vec![1, 3, -1, -1, -1],
            children_right: vec![2, 4, -1, -1, -1],
            value: vec![vec![9.0, 10.0], vec![8.0, 7.0], vec![1.0, 3.0], vec![8.0, 2.0], vec![0.0, 5.0]],
        }
    }

    pub fn features() -> Vec<Feature> {
        vec![Feature::CrypticDonor, Feature::Phylop]
    }

    fn vector(cryptic: f64, phylop: f64) -> FeatureVector {
        let mut vector = FeatureVector::default();
        vector.set(Feature::CrypticDonor, cryptic);
        vector.set(Feature::Phylop, phylop);
        vector
    }

    #[test]
    fn predict() {
        let tree = DecisionTree::new(&spec(), &features()).unwrap();
        assert_eq!(tree.len(), 5);
        for (cryptic, phylop, expected) in [
            (1.5, 0.0, 0.2),
            (-3.0, -1.0, 0.2),
            (1.0, 0.5, 1.0),
            (2.0, 0.0, 0.75),
        ] {
            assert_eq!(tree.predict_proba(&vector(cryptic, phylop)), expected, "{} {}", cryptic, phylop);
        }
    }

    #[test]
    fn nan_goes_right() {
        let tree = DecisionTree::new(&spec(), &features()).unwrap();
        assert_eq!(tree.predict_proba(&vector(f64::NAN, -10.0)), 0.75);
        assert_eq!(tree.predict_proba(&vector(0.0, f64::NAN)), 1.0);

        let mut missing = FeatureVector::default();
        missing.set(Feature::CrypticDonor, 0.0);
        assert_eq!(tree.predict_proba(&missing), 1.0);
    }

    #[test]
    fn leaf_counts() {
        // the leaf 4 is reachable only through the phylop split; probability comes straight from counts
        let mut spec = spec();
        spec.value[4] = vec![3.0, 7.0];
        let tree = DecisionTree::new(&spec, &features()).unwrap();
        assert_eq!(tree.predict_proba(&vector(0.0, 1.0)), 7.0 / (3.0 + 7.0));
    }

    #[test]
    fn invalid() {
        let mutations: [fn(&mut TreeSpec); 7] = [
            // single child
            |x| x.children_right[1] = -1,
            // cycle
            |x| x.children_left[0] = 0,
            // out of bounds child
            |x| x.children_left[0] = 7,
            |x| {
                x.threshold.pop();
            },
            |x| x.value[3] = vec![1.0],
            |x| x.value[3] = vec![0.0, 0.0],
            // unmapped feature index
            |x| x.feature[1] = 2,
        ];
        for mutate in mutations {
            let mut broken = spec();
            mutate(&mut broken);
            assert!(DecisionTree::new(&broken, &features()).is_err(), "{:?}", broken);
        }

        let empty =
            TreeSpec { feature: vec![], threshold: vec![], children_left: vec![], children_right: vec![], value: vec![] };
        assert!(DecisionTree::new(&empty, &features()).is_err());
    }
}
