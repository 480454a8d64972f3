//! Sequence classifier training
//!
//! Splits a preprocessed batch on its weak labels and fits a random forest
//! on the labeled part.

pub mod forest;
pub mod setup;
pub mod tree;

pub use forest::{ForestConfig, RandomForest};
pub use setup::{
    train_fit, train_setup, train_setup_with, LabelCodes, TrainSetup, CONTRAST_FEATURE,
};
pub use tree::{DecisionTree, TreeConfig, TreeNode};
