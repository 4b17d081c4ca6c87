//! Gradient-boosted tree model loading and inference.
//!
//! Models are stored as a JSON artifact produced offline by the training
//! pipeline: a small header (format version, expected feature count,
//! base score) followed by the tree ensemble. Each tree is a flat node
//! array with index links; a row is scored by walking every tree to a
//! leaf and summing the leaf contributions onto the base score.
//!
//! The loaded model is opaque, read-only, and shared by all requests.
//! Header fields are validated at load time so a bad artifact fails the
//! startup sequence with a descriptive error instead of serving garbage.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PanenError, Result};

/// Artifact format version accepted by this loader.
pub const FORMAT_VERSION: u32 = 1;

/// A node in a regression tree: an internal split or a terminal leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Internal split: rows with `features[feature] < threshold` go left.
    Split {
        /// Index into the feature vector
        feature: usize,
        /// Split threshold
        threshold: f32,
        /// Node index taken when the feature value is below the threshold
        left: usize,
        /// Node index taken otherwise
        right: usize,
    },
    /// Terminal leaf holding this tree's contribution to the prediction.
    Leaf {
        /// Leaf output value
        value: f32,
    },
}

/// One regression tree, nodes stored in a flat array rooted at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    /// Flat node storage; split nodes reference children by index.
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Walk the tree for one row and return the leaf value.
    fn score(&self, features: &[f32]) -> Result<f32> {
        let mut idx = 0usize;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).ok_or_else(|| PanenError::Inference {
                        reason: format!(
                            "split references feature {feature} but the vector has {} entries",
                            features.len()
                        ),
                    })?;
                    idx = if *value < *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                None => {
                    return Err(PanenError::Inference {
                        reason: format!("tree walk reached missing node index {idx}"),
                    })
                }
            }
        }
    }
}

/// Pre-trained gradient-boosted tree regressor.
///
/// Immutable after load; prediction is the base score plus the sum of
/// one leaf value per tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbtModel {
    format_version: u32,
    n_features: usize,
    base_score: f32,
    trees: Vec<RegressionTree>,
}

impl GbtModel {
    /// Assemble a model in memory. Used by tests and demo setups;
    /// production models come from [`GbtModel::load`].
    ///
    /// # Errors
    ///
    /// Returns [`PanenError::StartupLoad`] if the ensemble is empty.
    pub fn new(n_features: usize, base_score: f32, trees: Vec<RegressionTree>) -> Result<Self> {
        let model = Self {
            format_version: FORMAT_VERSION,
            n_features,
            base_score,
            trees,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load a model artifact from disk.
    ///
    /// # Errors
    ///
    /// Returns [`PanenError::StartupLoad`] if the file is missing,
    /// unreadable, or fails artifact validation.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| PanenError::StartupLoad {
            reason: format!(
                "model file '{}' not found or unreadable: {e}",
                path.display()
            ),
        })?;
        Self::from_slice(&data)
    }

    /// Parse and validate a model artifact from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PanenError::StartupLoad`] on malformed JSON, an
    /// unsupported format version, or an empty ensemble.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let model: Self = serde_json::from_slice(data).map_err(|e| PanenError::StartupLoad {
            reason: format!("model artifact is not valid JSON: {e}"),
        })?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(PanenError::StartupLoad {
                reason: format!(
                    "unsupported artifact format version {} (expected {FORMAT_VERSION})",
                    self.format_version
                ),
            });
        }
        if self.trees.is_empty() {
            return Err(PanenError::StartupLoad {
                reason: "model artifact contains no trees".to_string(),
            });
        }
        Ok(())
    }

    /// Feature count the model was trained with.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Base score added to every prediction.
    #[must_use]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// Score one row.
    ///
    /// # Errors
    ///
    /// Returns [`PanenError::Inference`] if the row length does not
    /// match the trained feature count or a tree is structurally broken.
    pub fn predict_row(&self, features: &[f32]) -> Result<f32> {
        if features.len() != self.n_features {
            return Err(PanenError::Inference {
                reason: format!(
                    "expected {} features, got {}",
                    self.n_features,
                    features.len()
                ),
            });
        }
        let mut sum = self.base_score;
        for tree in &self.trees {
            sum += tree.score(features)?;
        }
        Ok(sum)
    }

    /// Score a batch of rows; output order matches input order.
    ///
    /// # Errors
    ///
    /// Fails on the first row the model rejects; no partial output.
    pub fn predict_batch<'a, I>(&self, rows: I) -> Result<Vec<f32>>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        rows.into_iter().map(|row| self.predict_row(row)).collect()
    }
}
