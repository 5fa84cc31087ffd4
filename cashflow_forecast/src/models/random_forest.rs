//! Random forest regressor (bagged regression trees)

use super::decision_tree::{RegressionTree, TreeConfig};
use crate::error::{ForecastError, Result};
use crate::models::{check_training_set, Regressor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Mixed into a tree's seed to derive its feature-subsampling stream
const SUBSAMPLE_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Random Forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Max features per split (n/3 of total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(ForecastError::InvalidParameter(
                "A forest needs at least one tree".to_string(),
            ));
        }
        if self.max_depth == 0 || self.min_samples_leaf == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_depth and min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.max_features == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "max_features must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Random Forest model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    seed: u64,
    trees: Vec<RegressionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForestRegressor {
    /// Create an unfitted forest; tree `i` bootstraps with seed `seed + i`
    pub fn new(config: ForestConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            trees: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// Seeds of tree `i`: (bootstrap draw, feature subsampling)
    fn tree_seeds(&self, i: usize) -> (u64, u64) {
        let tree_seed = self.seed.wrapping_add(i as u64);
        (tree_seed, tree_seed ^ SUBSAMPLE_SEED_MIX)
    }

    fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Normalised importances averaged over the trees
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Feature names paired with importances, most important first
    pub fn feature_importance_ranking<'a>(&self, names: &'a [String]) -> Vec<(&'a str, f64)> {
        let mut ranking: Vec<(&str, f64)> = names
            .iter()
            .zip(self.feature_importances.iter())
            .map(|(n, &i)| (n.as_str(), i))
            .collect();

        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        check_training_set(features, targets)?;
        self.config.validate()?;

        let n_samples = features.len();
        let n_features = features[0].len();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features / 3).max(1));

        let mut trees = Vec::with_capacity(self.config.n_trees);
        for i in 0..self.config.n_trees {
            let (bootstrap_seed, subsample_seed) = self.tree_seeds(i);
            let mut tree = RegressionTree::new(TreeConfig {
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
                min_samples_leaf: self.config.min_samples_leaf,
                max_features: Some(max_features),
                seed: subsample_seed,
            });

            let indices = if self.config.bootstrap {
                Self::bootstrap_indices(n_samples, bootstrap_seed)
            } else {
                (0..n_samples).collect()
            };
            tree.fit_indices(features, targets, &indices)?;
            trees.push(tree);
        }

        // Aggregate feature importances
        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                importances[i] += imp;
            }
        }
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut importances {
                *imp /= sum;
            }
        }

        self.trees = trees;
        self.feature_importances = importances;
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(ForecastError::ModelNotTrained);
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.predict_row(row)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    fn name(&self) -> &str {
        "Random Forest"
    }
}
