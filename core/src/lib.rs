pub mod api;
pub mod error;
pub mod extraction;
pub mod features;
pub mod selection;
pub mod training;
pub mod types;

pub use api::{preprocess, FittedPreprocessor, Preprocessor};
pub use error::{MrseqError, Result};
pub use extraction::{extract_label, extract_labels, CandidateLabels};
pub use features::FEATURES;
pub use training::{train_fit, train_setup, ForestConfig, LabelCodes, RandomForest, TrainSetup};
pub use types::*;
