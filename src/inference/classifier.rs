//! Binary classifiers exported from the training step.

use serde::{Deserialize, Serialize};

/// A fitted binary classifier. Both kinds report the probability of the
/// positive (high-risk) class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression { coefficients: Vec<f64>, intercept: f64 },
    RandomForest { trees: Vec<DecisionTree> },
}

/// One tree in sklearn's flat layout: node 0 is the root and children
/// always come after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go left when `x[feature] <= threshold`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights `[negative, positive]` of the training samples here.
    Leaf { value: [f64; 2] },
}

impl Classifier {
    /// Check the classifier against the width of its feature vector.
    pub fn check(&self, n_features: usize) -> Result<(), String> {
        match self {
            Self::LogisticRegression { coefficients, .. } => {
                if coefficients.len() != n_features {
                    return Err(format!(
                        "logistic regression has {} coefficients for {} features",
                        coefficients.len(),
                        n_features
                    ));
                }
            }
            Self::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err("random forest has no trees".to_string());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.check(n_features).map_err(|e| format!("tree {i}: {e}"))?;
                }
            }
        }
        Ok(())
    }

    /// Probability of the positive class for an already-preprocessed vector.
    pub fn predict_proba(&self, x: &[f64]) -> f64 {
        match self {
            Self::LogisticRegression { coefficients, intercept } => {
                let z: f64 = coefficients.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + intercept;
                sigmoid(z)
            }
            Self::RandomForest { trees } => {
                let total: f64 = trees.iter().map(|t| t.leaf_proba(x)).sum();
                total / trees.len() as f64
            }
        }
    }
}

impl DecisionTree {
    fn check(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, left, right, .. } => {
                    if *feature >= n_features {
                        return Err(format!("node {i} splits on feature {feature}"));
                    }
                    // Forward-only children make every walk terminate
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.iter().any(|v| *v < 0.0) || value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("node {i} has an empty class distribution"));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_proba(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split { feature, threshold, left, right } => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value[1] / (value[0] + value[1]),
            }
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
