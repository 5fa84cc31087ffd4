//! Regression tree (CART with variance reduction)

use crate::error::{ForecastError, Result};
use crate::models::{check_training_set, Regressor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Regression tree configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for the feature subsampling
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        n_samples: usize,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Best split found for a node
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
    feature_importances: Vec<f64>,
}

impl RegressionTree {
    /// Create a new regression tree with config
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            feature_importances: Vec::new(),
        }
    }

    /// Fit on the rows named by `indices`; repeated indices act as sample weights.
    ///
    /// This is how the forest trains on a bootstrap draw without copying rows.
    pub fn fit_indices(
        &mut self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
    ) -> Result<()> {
        check_training_set(features, targets)?;
        if indices.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot fit a tree on zero samples".to_string(),
            ));
        }

        let n_features = features[0].len();
        self.feature_importances = vec![0.0; n_features];
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let root = self.build_node(features, targets, indices.to_vec(), 0, &mut rng);
        self.root = Some(root);

        // Normalize feature importances
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }

        Ok(())
    }

    fn build_node(
        &mut self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> TreeNode {
        let n = indices.len();
        let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
            (s + targets[i], sq + targets[i] * targets[i])
        });
        let value = sum / n as f64;
        let sse = sum_sq - sum * sum / n as f64;

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || sse <= 1e-9 * (1.0 + sum_sq.abs())
        {
            return TreeNode::Leaf { value, n_samples: n };
        }

        let Some(split) = self.find_best_split(features, targets, &indices, sse, rng) else {
            return TreeNode::Leaf { value, n_samples: n };
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| features[i][split.feature_idx] <= split.threshold);
        if left_idx.is_empty() || right_idx.is_empty() {
            return TreeNode::Leaf { value, n_samples: n };
        }

        self.feature_importances[split.feature_idx] += split.gain;

        let left = self.build_node(features, targets, left_idx, depth + 1, rng);
        let right = self.build_node(features, targets, right_idx, depth + 1, rng);

        TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            n_samples: n,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Scan sorted values of each candidate feature with running sums
    fn find_best_split(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        parent_sse: f64,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let n_features = features[0].len();
        let max_features = self
            .config
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features);

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let (total_sum, total_sq) = indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
            (s + targets[i], sq + targets[i] * targets[i])
        });

        let mut best: Option<SplitCandidate> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for &feature_idx in &feature_indices {
            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (features[i][feature_idx], targets[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..n - 1 {
                let (x, y) = pairs[k];
                left_sum += y;
                left_sq += y * y;

                let next_x = pairs[k + 1].0;
                if next_x <= x {
                    continue;
                }

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / n_left as f64;
                let right_sse = right_sq - right_sum * right_sum / n_right as f64;
                let gain = parent_sse - (left_sse + right_sse);

                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    let mid = (x + next_x) / 2.0;
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold: if mid < next_x { mid } else { x },
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Root node, if fitted
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Normalised variance reduction per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

impl Regressor for RegressionTree {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        let indices: Vec<usize> = (0..features.len()).collect();
        self.fit_indices(features, targets, &indices)
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        let mut node = self.root.as_ref().ok_or(ForecastError::ModelNotTrained)?;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return Ok(*value),
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let x = row.get(*feature_idx).ok_or_else(|| {
                        ForecastError::NumericError(format!(
                            "Row has {} features, tree splits on feature {}",
                            row.len(),
                            feature_idx
                        ))
                    })?;
                    node = if *x <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    fn name(&self) -> &str {
        "Regression Tree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tree_fits_step_function() {
        let features: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..40).map(|i| if i < 20 { 1.0 } else { 5.0 }).collect();

        let mut tree = RegressionTree::new(TreeConfig::default());
        tree.fit(&features, &targets).unwrap();

        assert_relative_eq!(tree.predict_row(&[3.0]).unwrap(), 1.0);
        assert_relative_eq!(tree.predict_row(&[35.0]).unwrap(), 5.0);
        assert_eq!(tree.root().unwrap().n_leaves(), 2);
        assert_relative_eq!(tree.feature_importances()[0], 1.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 1.0]).collect();
        let targets = vec![7.0; 10];

        let mut tree = RegressionTree::new(TreeConfig::default());
        tree.fit(&features, &targets).unwrap();

        assert!(tree.root().unwrap().is_leaf());
        assert_relative_eq!(tree.predict_row(&[100.0, 1.0]).unwrap(), 7.0);
    }

    #[test]
    fn test_max_depth_is_respected() {
        let features: Vec<Vec<f64>> = (0..64).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..64).map(|i| (i * i) as f64).collect();

        let mut tree = RegressionTree::new(TreeConfig {
            max_depth: 3,
            ..Default::default()
        });
        tree.fit(&features, &targets).unwrap();

        assert!(tree.root().unwrap().depth() <= 4);
    }

    #[test]
    fn test_unfitted_tree_reports_not_trained() {
        let tree = RegressionTree::new(TreeConfig::default());
        assert!(matches!(
            tree.predict_row(&[1.0]),
            Err(ForecastError::ModelNotTrained)
        ));
    }
}
