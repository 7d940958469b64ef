//! Random forest backend.
//!
//! Trees are flat node arrays. A split sends a sample left when
//! `x[feature] <= threshold`; a leaf holds per-class weights that are
//! normalised before averaging across trees.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use super::{label_for, Classifier};
use crate::error::ModelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 2],
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn leaf_distribution(&self, features: ArrayView1<'_, f64>) -> Result<[f64; 2], ModelError> {
        let mut idx = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| ModelError::Malformed(format!("node index {idx} out of range")))?;

            match node {
                Node::Split { feature, threshold, left, right } => {
                    let x = features.get(*feature).ok_or_else(|| {
                        ModelError::Malformed(format!("split on missing feature {feature}"))
                    })?;
                    idx = if *x <= *threshold { *left } else { *right };
                }
                Node::Leaf { value } => return normalise(value),
            }
        }
        Err(ModelError::Malformed("tree contains a cycle".to_string()))
    }
}

fn normalise(value: &[f64; 2]) -> Result<[f64; 2], ModelError> {
    let total = value[0] + value[1];
    if value.iter().any(|v| !v.is_finite() || *v < 0.0) || total <= 0.0 {
        return Err(ModelError::Malformed(format!("invalid leaf value {value:?}")));
    }
    Ok([value[0] / total, value[1] / total])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: ArrayView1<'_, f64>) -> Result<u8, ModelError> {
        self.predict_proba(features).map(|p| label_for(&p))
    }

    fn predict_proba(&self, features: ArrayView1<'_, f64>) -> Result<[f64; 2], ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::ShapeMismatch { expected: self.n_features, got: features.len() });
        }
        if self.trees.is_empty() {
            return Err(ModelError::Malformed("forest has no trees".to_string()));
        }

        let mut acc = [0.0; 2];
        for tree in &self.trees {
            let dist = tree.leaf_distribution(features)?;
            acc[0] += dist[0];
            acc[1] += dist[1];
        }
        let n = self.trees.len() as f64;
        Ok([acc[0] / n, acc[1] / n])
    }

    fn backend_type(&self) -> &str {
        "forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump(feature: usize, threshold: f64, left: [f64; 2], right: [f64; 2]) -> Tree {
        Tree {
            nodes: vec![
                Node::Split { feature, threshold, left: 1, right: 2 },
                Node::Leaf { value: left },
                Node::Leaf { value: right },
            ],
        }
    }

    #[test]
    fn test_averages_normalised_leaves() {
        let forest = RandomForest {
            n_features: 2,
            trees: vec![stump(0, 0.5, [9.0, 1.0], [1.0, 3.0]), stump(1, 10.0, [2.0, 2.0], [0.0, 5.0])],
        };

        let p = forest.predict_proba(array![1.0, 3.0].view()).unwrap();
        // (0.75 + 0.5) / 2
        assert!((p[1] - 0.625).abs() < 1e-12);
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
        assert_eq!(forest.predict(array![1.0, 3.0].view()).unwrap(), 1);

        let p = forest.predict_proba(array![0.5, 3.0].view()).unwrap();
        assert!((p[1] - 0.3).abs() < 1e-12);
        assert_eq!(forest.predict(array![0.5, 3.0].view()).unwrap(), 0);
    }

    #[test]
    fn test_deserializes_flat_nodes() {
        let json = r#"{
            "n_features": 1,
            "trees": [{"nodes": [
                {"feature": 0, "threshold": 1.5, "left": 1, "right": 2},
                {"value": [3, 1]},
                {"value": [0, 4]}
            ]}]
        }"#;
        let forest: RandomForest = serde_json::from_str(json).unwrap();
        assert_eq!(forest.predict_proba(array![2.0].view()).unwrap(), [0.0, 1.0]);
    }

    #[test]
    fn test_malformed_trees_fail_lazily() {
        let cyclic = RandomForest {
            n_features: 1,
            trees: vec![Tree { nodes: vec![Node::Split { feature: 0, threshold: 0.0, left: 0, right: 0 }] }],
        };
        assert!(matches!(cyclic.predict_proba(array![1.0].view()), Err(ModelError::Malformed(_))));

        let dangling = RandomForest {
            n_features: 1,
            trees: vec![Tree { nodes: vec![Node::Split { feature: 0, threshold: 0.0, left: 7, right: 7 }] }],
        };
        assert!(matches!(dangling.predict_proba(array![1.0].view()), Err(ModelError::Malformed(_))));

        let empty_leaf = RandomForest {
            n_features: 1,
            trees: vec![Tree { nodes: vec![Node::Leaf { value: [0.0, 0.0] }] }],
        };
        assert!(matches!(empty_leaf.predict_proba(array![1.0].view()), Err(ModelError::Malformed(_))));
    }

    #[test]
    fn test_shape_mismatch() {
        let forest = RandomForest { n_features: 3, trees: vec![stump(0, 0.0, [1.0, 0.0], [0.0, 1.0])] };
        let err = forest.predict_proba(array![1.0].view()).unwrap_err();
        assert_eq!(err, ModelError::ShapeMismatch { expected: 3, got: 1 });
    }
}
