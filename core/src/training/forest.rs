//! Random forest classifier

use super::tree::{argmax, DecisionTree, TreeConfig};
use crate::error::{MrseqError, Result};
use log::{debug, info};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Random forest configuration
///
/// Defaults grow 100 unpruned trees on bootstrap samples with
/// `floor(sqrt(n_features))` candidate features per split, seed 0, on two
/// worker threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = unlimited)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Max features per split (sqrt of total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
    /// Worker threads used while growing trees
    pub n_jobs: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 0,
            n_jobs: 2,
        }
    }
}

impl ForestConfig {
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    /// Candidate features per split for a given feature count
    pub fn max_features_for(&self, n_features: usize) -> usize {
        self.max_features
            .unwrap_or_else(|| (n_features as f64).sqrt() as usize)
            .clamp(1, n_features.max(1))
    }
}

/// Random forest model
///
/// Class probabilities are the mean of the per-tree leaf distributions;
/// the predicted class is their argmax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    feature_names: Vec<String>,
    n_classes: usize,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_names: Vec::new(),
            n_classes: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Names the feature columns, in `x` column order
    pub fn with_feature_names(mut self, names: &[&str]) -> Self {
        self.feature_names = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Trains the forest on rows `x` and class codes `y` in `0..n_classes`
    ///
    /// Trees are grown on a dedicated rayon pool of `n_jobs` threads. Each
    /// tree draws its bootstrap sample and split features from its own
    /// seeded RNG, so the result does not depend on the thread count.
    ///
    /// # Errors
    ///
    /// Returns [`MrseqError::Training`] for empty or ragged input, a label
    /// count that differs from the row count, a label outside
    /// `0..n_classes`, or a zero tree count. An `n_jobs` of 0 lets rayon
    /// pick the thread count.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Result<()> {
        let n_features = validate(x, y, n_classes)?;
        if self.config.n_trees == 0 {
            return Err(MrseqError::Training("n_trees must be at least 1".to_string()));
        }
        if !self.feature_names.is_empty() && self.feature_names.len() != n_features {
            return Err(MrseqError::Training(format!(
                "{} feature names for {} feature columns",
                self.feature_names.len(),
                n_features
            )));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.n_jobs)
            .build()
            .map_err(|e| MrseqError::Training(e.to_string()))?;

        let max_features = self.config.max_features_for(n_features);
        debug!(
            "Growing {} trees on {} samples, {} of {} features per split",
            self.config.n_trees,
            x.len(),
            max_features,
            n_features
        );

        let config = &self.config;
        let trees: Vec<DecisionTree> = pool.install(|| {
            (0..config.n_trees)
                .into_par_iter()
                .map(|i| {
                    let seed = config.seed.wrapping_add(i as u64);
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    let samples: Vec<usize> = if config.bootstrap {
                        (0..x.len()).map(|_| rng.gen_range(0..x.len())).collect()
                    } else {
                        (0..x.len()).collect()
                    };

                    let mut tree = DecisionTree::new(TreeConfig {
                        max_depth: config.max_depth,
                        min_samples_split: config.min_samples_split,
                        min_samples_leaf: config.min_samples_leaf,
                        max_features: Some(max_features),
                        seed,
                    });
                    tree.fit_samples(x, y, n_classes, &samples, &mut rng);
                    tree
                })
                .collect()
        });

        self.trees = trees;
        self.n_classes = n_classes;

        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                self.feature_importances[i] += imp;
            }
        }
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }

        info!(
            "Fitted random forest: {} trees, {} classes, {} features",
            self.trees.len(),
            n_classes,
            n_features
        );
        Ok(())
    }

    /// Class probabilities for a single sample
    pub fn predict_proba_one(&self, features: &[f64]) -> Vec<f64> {
        let mut probs = vec![0.0; self.n_classes];
        if self.trees.is_empty() {
            return probs;
        }
        for tree in &self.trees {
            for (p, q) in probs.iter_mut().zip(tree.predict_proba_one(features)) {
                *p += q;
            }
        }
        let n = self.trees.len() as f64;
        probs.iter_mut().for_each(|p| *p /= n);
        probs
    }

    pub fn predict_one(&self, features: &[f64]) -> usize {
        argmax(&self.predict_proba_one(features))
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<usize> {
        x.par_iter().map(|f| self.predict_one(f)).collect()
    }

    pub fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>> {
        x.par_iter().map(|f| self.predict_proba_one(f)).collect()
    }

    /// Fraction of rows whose predicted class equals `y`
    pub fn accuracy(&self, x: &[Vec<f64>], y: &[usize]) -> f64 {
        if x.is_empty() {
            return 0.0;
        }
        let correct = self
            .predict(x)
            .iter()
            .zip(y)
            .filter(|(pred, label)| pred == label)
            .count();
        correct as f64 / x.len() as f64
    }

    /// Mean normalized impurity decrease per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Feature names with importances, most important first
    pub fn feature_importance_ranking(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self
            .feature_names
            .iter()
            .zip(self.feature_importances.iter())
            .map(|(n, &i)| (n.as_str(), i))
            .collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Writes the fitted model as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer(writer, self)?;
        info!("Saved model to {}", path.as_ref().display());
        Ok(())
    }

    /// Reads a model written by [`RandomForest::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Checks training input shape, returning the feature count
fn validate(x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Result<usize> {
    let n_features = match x.first() {
        Some(row) => row.len(),
        None => return Err(MrseqError::Training("no training rows".to_string())),
    };
    if n_features == 0 {
        return Err(MrseqError::Training("no feature columns".to_string()));
    }
    if let Some(i) = x.iter().position(|row| row.len() != n_features) {
        return Err(MrseqError::Training(format!(
            "row {} has {} features, expected {}",
            i,
            x[i].len(),
            n_features
        )));
    }
    if y.len() != x.len() {
        return Err(MrseqError::Training(format!(
            "{} labels for {} rows",
            y.len(),
            x.len()
        )));
    }
    if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
        return Err(MrseqError::Training(format!(
            "label {} outside 0..{}",
            label, n_classes
        )));
    }
    Ok(n_features)
}
