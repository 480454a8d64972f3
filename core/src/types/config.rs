use super::ExclusionFilter;
use crate::features::vocabulary::{BINARIZE, DUMMIES, FEATURES, KEEP, RESCALE};
use serde::{Deserialize, Serialize};

/// How a scalar string code is split into one-hot codes
///
/// List values always contribute one code per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeSplitting {
    /// Every character of the string is a code ("SE" -> S, E).
    /// This is how the closed vocabulary was built.
    #[default]
    Characters,

    /// The whole string is a single code ("SE" -> SE)
    Whole,
}

/// A multi-valued column and the prefix of its indicator columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DummyColumn {
    pub column: String,
    pub prefix: String,
}

impl DummyColumn {
    pub fn new(column: &str, prefix: &str) -> Self {
        Self {
            column: column.to_string(),
            prefix: prefix.to_string(),
        }
    }
}

/// Configuration of the preprocessing pipeline
///
/// The default reproduces the established column lists and the closed
/// 88-name feature vocabulary.
///
/// # Example
///
/// ```
/// use mrseq_core::{CodeSplitting, PreprocessConfig};
///
/// let config = PreprocessConfig::default()
///     .code_splitting(CodeSplitting::Whole)
///     .clip(false);
///
/// assert_eq!(config.features.len(), 88);
/// assert!(!config.clip);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Records excluded before anything else
    pub exclusion: ExclusionFilter,

    /// Columns projected from the batch (missing ones are an error)
    pub keep: Vec<String>,

    /// Multi-valued columns expanded to indicator columns
    pub dummies: Vec<DummyColumn>,

    /// Columns recoded to {0, 1}
    pub binarize: Vec<String>,

    /// Columns min-max rescaled to [0, 1]
    pub rescale: Vec<String>,

    /// Closed output schema, in column order
    pub features: Vec<String>,

    /// Splitting policy for scalar code strings
    pub code_splitting: CodeSplitting,

    /// Clip rescaled values to [0, 1]
    pub clip: bool,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            exclusion: ExclusionFilter::default(),
            keep: owned(KEEP),
            dummies: DUMMIES
                .iter()
                .map(|(column, prefix)| DummyColumn::new(column, prefix))
                .collect(),
            binarize: owned(BINARIZE),
            rescale: owned(RESCALE),
            features: owned(FEATURES),
            code_splitting: CodeSplitting::default(),
            clip: true,
        }
    }
}

impl PreprocessConfig {
    /// Builder: Set the exclusion filter
    pub fn with_exclusion(mut self, exclusion: ExclusionFilter) -> Self {
        self.exclusion = exclusion;
        self
    }

    /// Builder: Replace the closed feature vocabulary
    pub fn with_features(mut self, features: &[&str]) -> Self {
        self.features = owned(features);
        self
    }

    /// Builder: Set the code splitting policy
    pub fn code_splitting(mut self, splitting: CodeSplitting) -> Self {
        self.code_splitting = splitting;
        self
    }

    /// Builder: Enable or disable clipping of rescaled values
    pub fn clip(mut self, clip: bool) -> Self {
        self.clip = clip;
        self
    }

    /// Loads a configuration from JSON
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
