//! Multi-class CART decision tree (gini impurity)

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree (None = grow until pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 0,
        }
    }
}

/// Tree node, stored in a flat arena and linked by index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNode {
    Leaf {
        /// Class distribution of the training samples in this leaf
        class_probs: Vec<f64>,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
        impurity: f64,
    },
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn n_samples(&self) -> usize {
        match self {
            TreeNode::Leaf { n_samples, .. } | TreeNode::Split { n_samples, .. } => *n_samples,
        }
    }
}

#[derive(Clone, Copy)]
enum Branch {
    Left,
    Right,
}

/// Subtree waiting to be grown
struct GrowTask {
    samples: Vec<usize>,
    depth: usize,
    /// Split node and branch that will point at this subtree
    parent: Option<(usize, Branch)>,
}

struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Decision tree classifier over integer class codes `0..n_classes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    n_classes: usize,
    nodes: Vec<TreeNode>,
    root: Option<usize>,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            n_classes: 0,
            nodes: Vec::new(),
            root: None,
            feature_importances: Vec::new(),
        }
    }

    /// Trains on every row of `x`
    ///
    /// Rows must share one width and every label must be below `n_classes`;
    /// [`RandomForest::fit`](super::RandomForest::fit) checks this before
    /// growing trees.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[usize], n_classes: usize) {
        let samples: Vec<usize> = (0..x.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.fit_samples(x, y, n_classes, &samples, &mut rng);
    }

    /// Trains on the given sample indices (repeats allowed, as in a bootstrap)
    pub(crate) fn fit_samples(
        &mut self,
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        samples: &[usize],
        rng: &mut ChaCha8Rng,
    ) {
        let n_features = x.first().map_or(0, |row| row.len());
        self.n_classes = n_classes;
        self.nodes.clear();
        self.feature_importances = vec![0.0; n_features];

        self.root = if samples.is_empty() {
            None
        } else {
            Some(self.build_tree(x, y, samples.to_vec(), rng))
        };

        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    /// Grows the tree for `samples` and returns the root index
    ///
    /// Nodes are grown depth-first from an explicit work stack, left branch
    /// before right, so tree depth is bounded by memory rather than the
    /// thread stack.
    fn build_tree(
        &mut self,
        x: &[Vec<f64>],
        y: &[usize],
        samples: Vec<usize>,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let mut stack = vec![GrowTask {
            samples,
            depth: 0,
            parent: None,
        }];
        let mut root = 0;

        while let Some(task) = stack.pop() {
            let idx = self.grow_node(x, y, task.samples, task.depth, rng, &mut stack);
            match task.parent {
                None => root = idx,
                Some((parent, branch)) => self.link(parent, branch, idx),
            }
        }
        root
    }

    /// Pushes a leaf or a split for one task and queues the split's children
    fn grow_node(
        &mut self,
        x: &[Vec<f64>],
        y: &[usize],
        samples: Vec<usize>,
        depth: usize,
        rng: &mut ChaCha8Rng,
        stack: &mut Vec<GrowTask>,
    ) -> usize {
        let n = samples.len();
        let counts = self.class_counts(y, &samples);
        let impurity = gini(&counts, n);

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || n < self.config.min_samples_split || impurity < 1e-10 {
            return self.push_leaf(&counts, n);
        }

        let split = match self.find_best_split(x, y, &samples, &counts, impurity, rng) {
            Some(split) => split,
            None => return self.push_leaf(&counts, n),
        };

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&i| x[i][split.feature_idx] <= split.threshold);

        self.feature_importances[split.feature_idx] += split.gain * n as f64;

        // children are linked once they are grown
        self.nodes.push(TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left: 0,
            right: 0,
            n_samples: n,
            impurity,
        });
        let idx = self.nodes.len() - 1;

        stack.push(GrowTask {
            samples: right_samples,
            depth: depth + 1,
            parent: Some((idx, Branch::Right)),
        });
        stack.push(GrowTask {
            samples: left_samples,
            depth: depth + 1,
            parent: Some((idx, Branch::Left)),
        });
        idx
    }

    fn link(&mut self, parent: usize, branch: Branch, child: usize) {
        if let TreeNode::Split { left, right, .. } = &mut self.nodes[parent] {
            match branch {
                Branch::Left => *left = child,
                Branch::Right => *right = child,
            }
        }
    }

    fn push_leaf(&mut self, counts: &[usize], n: usize) -> usize {
        let class_probs = counts.iter().map(|&c| c as f64 / n as f64).collect();
        self.nodes.push(TreeNode::Leaf {
            class_probs,
            n_samples: n,
        });
        self.nodes.len() - 1
    }

    /// Finds the split with the largest impurity decrease
    ///
    /// # Algorithm
    ///
    /// 1. Shuffle the feature indices and keep the first `max_features`
    /// 2. For each kept feature, sort the samples by value and sweep the
    ///    boundary between distinct adjacent values, updating left class
    ///    counts incrementally
    /// 3. The threshold is the midpoint of the two values around the boundary
    ///
    /// Returns `None` when no split decreases impurity.
    fn find_best_split(
        &self,
        x: &[Vec<f64>],
        y: &[usize],
        samples: &[usize],
        counts: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n = samples.len();
        let n_features = self.feature_importances.len();
        let max_features = self.config.max_features.unwrap_or(n_features).max(1);

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let mut best_gain = 0.0;
        let mut best_split: Option<SplitCandidate> = None;
        let mut order = samples.to_vec();
        let mut left = vec![0usize; self.n_classes];
        let mut right = vec![0usize; self.n_classes];

        for &feature_idx in &feature_indices {
            order.sort_by(|&a, &b| x[a][feature_idx].total_cmp(&x[b][feature_idx]));
            left.iter_mut().for_each(|c| *c = 0);

            for pos in 1..n {
                left[y[order[pos - 1]]] += 1;

                let lo = x[order[pos - 1]][feature_idx];
                let hi = x[order[pos]][feature_idx];
                if lo == hi {
                    continue;
                }

                let n_left = pos;
                let n_right = n - pos;
                if n_left < self.config.min_samples_leaf || n_right < self.config.min_samples_leaf {
                    continue;
                }

                for (r, (&total, &l)) in right.iter_mut().zip(counts.iter().zip(left.iter())) {
                    *r = total - l;
                }

                let weighted = (n_left as f64 * gini(&left, n_left)
                    + n_right as f64 * gini(&right, n_right))
                    / n as f64;
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    let mut threshold = (lo + hi) / 2.0;
                    // midpoint of adjacent floats can round up to `hi`
                    if threshold == hi {
                        threshold = lo;
                    }
                    best_split = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best_split
    }

    fn class_counts(&self, y: &[usize], samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in samples {
            counts[y[i]] += 1;
        }
        counts
    }

    /// Class distribution of the leaf `features` falls into
    ///
    /// An unfitted tree returns an empty slice.
    pub fn predict_proba_one(&self, features: &[f64]) -> &[f64] {
        let mut idx = match self.root {
            Some(root) => root,
            None => return &[],
        };
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { class_probs, .. } => return class_probs,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if features[*feature_idx] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Most probable class (lowest code wins ties)
    pub fn predict_one(&self, features: &[f64]) -> usize {
        argmax(self.predict_proba_one(features))
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<usize> {
        x.iter().map(|f| self.predict_one(f)).collect()
    }

    /// Normalized impurity decrease per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of levels on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(usize, usize)> =
            self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let TreeNode::Split { left, right, .. } = &self.nodes[idx] {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        max_depth
    }
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
