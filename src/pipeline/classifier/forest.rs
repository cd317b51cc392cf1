//! Random-forest disease classifier loaded from the JSON model artifact.
//!
//! Each tree routes the symptom vector from its root (node 0) to a leaf by
//! going left when `x[feature] <= threshold`. A leaf stores per-class weights;
//! the forest's probability for a class is the mean over trees of the leaf's
//! normalized weight for that class.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{check_features, ClassProbabilities, ClassifierError, DiseaseClassifier};
use crate::pipeline::vectorize::SymptomVector;

/// On-disk shape of the classifier artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestFile {
    #[serde(default)]
    pub version: Option<String>,
    pub n_features: usize,
    pub classes: Vec<String>,
    pub trees: Vec<TreeFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeFile {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Normalized class distribution.
    Leaf(Vec<f64>),
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn leaf_for(&self, vector: &SymptomVector) -> Result<&[f64], ClassifierError> {
        let mut index = 0;
        // Children always point forward, so this walk is bounded by nodes.len().
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf(distribution)) => return Ok(distribution.as_slice()),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = vector.feature(*feature).ok_or_else(|| {
                        ClassifierError::MalformedModel(format!("feature {feature} out of range"))
                    })?;
                    index = if x <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(ClassifierError::MalformedModel(format!(
                        "node {index} out of range"
                    )))
                }
            }
        }
    }
}

/// Immutable random-forest ensemble.
#[derive(Debug)]
pub struct RandomForest {
    classes: Vec<String>,
    n_features: usize,
    trees: Vec<Tree>,
    version: Option<String>,
}

impl RandomForest {
    /// Validate the artifact and build the forest.
    pub fn from_file(file: ForestFile) -> Result<Self, ClassifierError> {
        if file.classes.is_empty() {
            return Err(ClassifierError::NoClasses);
        }
        let mut seen = HashSet::new();
        for class in &file.classes {
            if !seen.insert(class.as_str()) {
                return Err(malformed(format!("duplicate class \"{class}\"")));
            }
        }
        if file.n_features == 0 {
            return Err(malformed("model declares zero features".into()));
        }
        if file.trees.is_empty() {
            return Err(malformed("model contains no trees".into()));
        }

        let n_classes = file.classes.len();
        let trees = file
            .trees
            .into_iter()
            .enumerate()
            .map(|(t, tree)| build_tree(t, tree, file.n_features, n_classes))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            classes: file.classes,
            n_features: file.n_features,
            trees,
            version: file.version,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn malformed(message: String) -> ClassifierError {
    ClassifierError::MalformedModel(message)
}

fn build_tree(
    tree_index: usize,
    tree: TreeFile,
    n_features: usize,
    n_classes: usize,
) -> Result<Tree, ClassifierError> {
    if tree.nodes.is_empty() {
        return Err(malformed(format!("tree {tree_index} has no nodes")));
    }
    let n_nodes = tree.nodes.len();

    let nodes = tree
        .nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| match node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if feature >= n_features {
                    return Err(malformed(format!(
                        "tree {tree_index} node {i}: feature {feature} >= {n_features}"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(malformed(format!(
                        "tree {tree_index} node {i}: non-finite threshold"
                    )));
                }
                for child in [left, right] {
                    if child <= i || child >= n_nodes {
                        return Err(malformed(format!(
                            "tree {tree_index} node {i}: invalid child {child}"
                        )));
                    }
                }
                Ok(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                })
            }
            TreeNode::Leaf { value } => {
                if value.len() != n_classes {
                    return Err(malformed(format!(
                        "tree {tree_index} node {i}: leaf has {} weights for {n_classes} classes",
                        value.len()
                    )));
                }
                if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(malformed(format!(
                        "tree {tree_index} node {i}: negative or non-finite leaf weight"
                    )));
                }
                let total: f64 = value.iter().sum();
                if total <= 0.0 {
                    return Err(malformed(format!(
                        "tree {tree_index} node {i}: leaf weights sum to zero"
                    )));
                }
                Ok(Node::Leaf(value.iter().map(|w| w / total).collect()))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Tree { nodes })
}

impl DiseaseClassifier for RandomForest {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, vector: &SymptomVector) -> Result<ClassProbabilities, ClassifierError> {
        check_features(self, vector)?;

        let mut totals = vec![0.0_f64; self.classes.len()];
        for tree in &self.trees {
            let distribution = tree.leaf_for(vector)?;
            for (total, p) in totals.iter_mut().zip(distribution) {
                *total += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        ClassProbabilities::new(
            self.classes
                .iter()
                .cloned()
                .zip(totals.into_iter().map(|t| t / n_trees))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Two features (fever, cough), three classes (Flu, Cold, Migraine).
    fn sample_file() -> ForestFile {
        serde_json::from_value(json!({
            "version": "test-1",
            "n_features": 2,
            "classes": ["Flu", "Cold", "Migraine"],
            "trees": [
                {"nodes": [
                    {"split": {"feature": 0, "threshold": 0.5, "left": 1, "right": 2}},
                    {"leaf": {"value": [0.0, 2.0, 8.0]}},
                    {"leaf": {"value": [9.0, 1.0, 0.0]}}
                ]},
                {"nodes": [
                    {"split": {"feature": 1, "threshold": 0.5, "left": 1, "right": 2}},
                    {"leaf": {"value": [1.0, 0.0, 1.0]}},
                    {"leaf": {"value": [1.0, 1.0, 0.0]}}
                ]}
            ]
        }))
        .unwrap()
    }

    fn vector(values: &[u8]) -> SymptomVector {
        let vocab = crate::vocabulary::LabelVocabulary::new(vec!["fever".into(), "cough".into()])
            .unwrap();
        let labels: Vec<&str> = values
            .iter()
            .zip(vocab.labels())
            .filter(|&(&v, _)| v == 1)
            .map(|(_, l)| l.as_str())
            .collect();
        crate::pipeline::vectorize::vectorize(&vocab, &labels)
    }

    #[test]
    fn loads_sample_forest() {
        let forest = RandomForest::from_file(sample_file()).unwrap();
        assert_eq!(forest.n_trees(), 2);
        assert_eq!(forest.n_features(), 2);
        assert_eq!(forest.classes(), &["Flu", "Cold", "Migraine"]);
        assert_eq!(forest.version(), Some("test-1"));
    }

    #[test]
    fn averages_normalized_leaves() {
        let forest = RandomForest::from_file(sample_file()).unwrap();
        // fever + cough: tree0 → [0.9, 0.1, 0.0], tree1 → [0.5, 0.5, 0.0]
        let probs = forest.predict_proba(&vector(&[1, 1])).unwrap();
        assert!((probs.get("Flu").unwrap() - 0.7).abs() < 1e-12);
        assert!((probs.get("Cold").unwrap() - 0.3).abs() < 1e-12);
        assert!(probs.get("Migraine").unwrap().abs() < 1e-12);
    }

    #[test]
    fn left_branch_on_absent_symptom() {
        let forest = RandomForest::from_file(sample_file()).unwrap();
        // no fever, no cough: tree0 → [0, 0.2, 0.8], tree1 → [0.5, 0, 0.5]
        let probs = forest.predict_proba(&vector(&[0, 0])).unwrap();
        assert!((probs.get("Flu").unwrap() - 0.25).abs() < 1e-12);
        assert!((probs.get("Cold").unwrap() - 0.1).abs() < 1e-12);
        assert!((probs.get("Migraine").unwrap() - 0.65).abs() < 1e-12);
    }

    #[test]
    fn preserves_class_order() {
        let forest = RandomForest::from_file(sample_file()).unwrap();
        let probs = forest.predict_proba(&vector(&[1, 0])).unwrap();
        let order: Vec<&str> = probs.entries().iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(order, vec!["Flu", "Cold", "Migraine"]);
    }

    #[test]
    fn rejects_wrong_vector_width() {
        let forest = RandomForest::from_file(sample_file()).unwrap();
        let result = forest.predict_proba(&SymptomVector::zeros(5));
        assert!(matches!(result, Err(ClassifierError::FeatureMismatch { .. })));
    }

    #[test]
    fn rejects_backward_child() {
        let mut file = sample_file();
        file.trees[0].nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 0.5,
            left: 0,
            right: 2,
        };
        let err = RandomForest::from_file(file).unwrap_err();
        assert!(err.to_string().contains("invalid child"));
    }

    #[test]
    fn rejects_child_out_of_range() {
        let mut file = sample_file();
        file.trees[1].nodes[0] = TreeNode::Split {
            feature: 1,
            threshold: 0.5,
            left: 1,
            right: 7,
        };
        assert!(RandomForest::from_file(file).is_err());
    }

    #[test]
    fn rejects_feature_out_of_range() {
        let mut file = sample_file();
        file.trees[0].nodes[0] = TreeNode::Split {
            feature: 2,
            threshold: 0.5,
            left: 1,
            right: 2,
        };
        assert!(RandomForest::from_file(file).is_err());
    }

    #[test]
    fn rejects_leaf_width_mismatch() {
        let mut file = sample_file();
        file.trees[0].nodes[1] = TreeNode::Leaf {
            value: vec![1.0, 1.0],
        };
        assert!(RandomForest::from_file(file).is_err());
    }

    #[test]
    fn rejects_zero_leaf() {
        let mut file = sample_file();
        file.trees[0].nodes[1] = TreeNode::Leaf {
            value: vec![0.0, 0.0, 0.0],
        };
        assert!(RandomForest::from_file(file).is_err());
    }

    #[test]
    fn rejects_duplicate_classes() {
        let mut file = sample_file();
        file.classes[2] = "Flu".into();
        assert!(RandomForest::from_file(file).is_err());
    }

    #[test]
    fn rejects_empty_forest() {
        let mut file = sample_file();
        file.trees.clear();
        assert!(RandomForest::from_file(file).is_err());
    }
}
