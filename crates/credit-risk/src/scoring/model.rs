use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::DECISION_THRESHOLD;

/// Fitted binary classifier consumed by the scoring engine.
///
/// Implementations are immutable once built and may be shared across threads.
pub trait Classifier: Send + Sync {
    /// Feature names, in the order `features` must be supplied.
    fn feature_names(&self) -> &[String];

    /// Estimated probability of the positive (default) class.
    fn predict_proba(&self, features: &[f64]) -> f64;

    /// Class label at the fixed decision threshold.
    fn predict_class(&self, features: &[f64]) -> bool {
        self.predict_proba(features) >= DECISION_THRESHOLD
    }
}

/// Source of a classifier, injected into the engine so tests can swap in fakes.
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn Classifier>, ModelError>;

    /// Human-readable location used in logs.
    fn describe(&self) -> String;
}

/// Reasons a classifier artifact could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact {path:?} could not be read")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact could not be decoded")]
    Decode(#[from] serde_json::Error),
    #[error("model artifact is malformed: {0}")]
    Malformed(String),
}

/// Reads a JSON tree-ensemble artifact from disk.
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    path: PathBuf,
}

impl ArtifactLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelLoader for ArtifactLoader {
    fn load(&self) -> Result<Arc<dyn Classifier>, ModelError> {
        let model = TreeEnsemble::from_path(&self.path)?;
        Ok(Arc::new(model))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Node of a regression tree, stored in a flat array with index links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default = "default_left")]
        default_left: bool,
    },
    Leaf {
        value: f64,
    },
}

fn default_left() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn leaf_value(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let value = features[*feature];
                    let go_left = if value.is_nan() {
                        *default_left
                    } else {
                        value < *threshold
                    };
                    index = if go_left { *left } else { *right };
                }
            }
        }
    }

    fn check(&self, tree_index: usize, feature_count: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Malformed(format!("tree {tree_index} has no nodes")));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } if !value.is_finite() => {
                    return Err(ModelError::Malformed(format!(
                        "tree {tree_index} node {index} has a non-finite leaf value"
                    )));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= feature_count {
                        return Err(ModelError::Malformed(format!(
                            "tree {tree_index} node {index} splits on feature {feature} of {feature_count}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::Malformed(format!(
                            "tree {tree_index} node {index} has a non-finite threshold"
                        )));
                    }
                    // Children must point forward so traversal always terminates.
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(ModelError::Malformed(format!(
                                "tree {tree_index} node {index} links to invalid child {child}"
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Gradient-boosted tree ensemble with a logistic link.
///
/// The raw margin is `base_margin` plus one leaf value per tree; the probability is the
/// sigmoid of that margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EnsembleArtifact")]
pub struct TreeEnsemble {
    feature_names: Vec<String>,
    base_margin: f64,
    trees: Vec<Tree>,
}

/// Decoded artifact before its structure has been checked.
#[derive(Deserialize)]
struct EnsembleArtifact {
    feature_names: Vec<String>,
    #[serde(default)]
    base_margin: f64,
    trees: Vec<Tree>,
}

impl TryFrom<EnsembleArtifact> for TreeEnsemble {
    type Error = ModelError;

    fn try_from(artifact: EnsembleArtifact) -> Result<Self, Self::Error> {
        TreeEnsemble::new(artifact.feature_names, artifact.base_margin, artifact.trees)
    }
}

impl TreeEnsemble {
    pub fn new(
        feature_names: Vec<String>,
        base_margin: f64,
        trees: Vec<Tree>,
    ) -> Result<Self, ModelError> {
        let model = Self {
            feature_names,
            base_margin,
            trees,
        };
        model.check()?;
        Ok(model)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        let artifact: EnsembleArtifact = serde_json::from_reader(reader)?;
        TreeEnsemble::try_from(artifact)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn margin(&self, features: &[f64]) -> f64 {
        self.trees
            .iter()
            .map(|tree| tree.leaf_value(features))
            .fold(self.base_margin, |acc, value| acc + value)
    }

    fn check(&self) -> Result<(), ModelError> {
        if self.feature_names.is_empty() {
            return Err(ModelError::Malformed("no feature names declared".to_string()));
        }

        let mut seen = HashSet::new();
        for name in &self.feature_names {
            if !seen.insert(name.as_str()) {
                return Err(ModelError::Malformed(format!(
                    "feature '{name}' declared more than once"
                )));
            }
        }

        if !self.base_margin.is_finite() {
            return Err(ModelError::Malformed("base margin is not finite".to_string()));
        }

        if self.trees.is_empty() {
            return Err(ModelError::Malformed("ensemble has no trees".to_string()));
        }

        for (index, tree) in self.trees.iter().enumerate() {
            tree.check(index, self.feature_names.len())?;
        }

        Ok(())
    }
}

impl Classifier for TreeEnsemble {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.margin(features))
    }
}

pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}
