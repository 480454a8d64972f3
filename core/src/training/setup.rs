use super::forest::{ForestConfig, RandomForest};
use crate::api::{FittedPreprocessor, Preprocessor};
use crate::error::{MrseqError, Result};
use crate::extraction::{extract_labels, CandidateLabels};
use crate::selection::exclude_other;
use crate::types::{FeatureFrame, SeqLabel, SeriesBatch};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the label column that can be selected as a training feature
pub const CONTRAST_FEATURE: &str = "contrast";

/// Integer codes for sequence labels
///
/// Codes are assigned in first-seen order, so the mapping is stable for a
/// given training batch but not across batches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCodes {
    names: Vec<SeqLabel>,
}

impl LabelCodes {
    /// Assigns codes to labels in first-seen order
    ///
    /// Returns the mapping and the code of every input label.
    ///
    /// # Example
    ///
    /// ```
    /// use mrseq_core::{training::LabelCodes, SeqLabel};
    ///
    /// let (codes, y) = LabelCodes::factorize([SeqLabel::T2, SeqLabel::T1, SeqLabel::T2]);
    /// assert_eq!(y, vec![0, 1, 0]);
    /// assert_eq!(codes.decode(1), Some(SeqLabel::T1));
    /// ```
    pub fn factorize(labels: impl IntoIterator<Item = SeqLabel>) -> (Self, Vec<usize>) {
        let mut codes = LabelCodes::default();
        let y = labels
            .into_iter()
            .map(|label| match codes.encode(label) {
                Some(code) => code,
                None => {
                    codes.names.push(label);
                    codes.names.len() - 1
                }
            })
            .collect();
        (codes, y)
    }

    pub fn encode(&self, label: SeqLabel) -> Option<usize> {
        self.names.iter().position(|&l| l == label)
    }

    pub fn decode(&self, code: usize) -> Option<SeqLabel> {
        self.names.get(code).copied()
    }

    /// Labels indexed by code
    pub fn names(&self) -> &[SeqLabel] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Labeled and held-out partitions of a preprocessed batch
#[derive(Debug, Clone)]
pub struct TrainSetup {
    /// Feature rows whose sequence label is known
    pub train: FeatureFrame,
    /// Feature rows labeled `unknown`
    pub test: FeatureFrame,
    pub train_labels: Vec<CandidateLabels>,
    pub test_labels: Vec<CandidateLabels>,
    /// Integer label of every `train` row
    pub y: Vec<usize>,
    pub label_codes: LabelCodes,
    /// Preprocessing state fit on the batch, for encoding new series
    pub preprocessor: FittedPreprocessor,
}

impl TrainSetup {
    /// Training matrix for the named columns
    ///
    /// Any feature column can be named, as can [`CONTRAST_FEATURE`], which
    /// reads the extracted contrast label.
    ///
    /// # Errors
    ///
    /// Returns [`MrseqError::MissingColumn`] for unknown names.
    pub fn train_matrix(&self, features: &[&str]) -> Result<Vec<Vec<f64>>> {
        feature_matrix(&self.train, &self.train_labels, features)
    }

    /// Held-out matrix for the named columns
    pub fn test_matrix(&self, features: &[&str]) -> Result<Vec<Vec<f64>>> {
        feature_matrix(&self.test, &self.test_labels, features)
    }
}

fn feature_matrix(
    frame: &FeatureFrame,
    labels: &[CandidateLabels],
    features: &[&str],
) -> Result<Vec<Vec<f64>>> {
    enum Source {
        Column(usize),
        Contrast,
    }

    let sources = features
        .iter()
        .map(|&name| match name {
            CONTRAST_FEATURE => Ok(Source::Contrast),
            _ => frame.column_index(name).map(Source::Column),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(frame
        .rows()
        .iter()
        .zip(labels)
        .map(|(row, label)| {
            sources
                .iter()
                .map(|source| match source {
                    Source::Column(idx) => row[*idx],
                    Source::Contrast => f64::from(label.contrast),
                })
                .collect()
        })
        .collect())
}

/// Preprocesses a batch and splits it on the weak sequence label
///
/// # Algorithm
///
/// 1. Fit and apply the default preprocessing to the batch
/// 2. Extract candidate labels from the excluded, unencoded records
///    (one per feature row, same order)
/// 3. Rows labeled `unknown` form `test`; all others form `train`
/// 4. Factorize the train labels in first-seen order
///
/// # Errors
///
/// Fails on any preprocessing or label extraction error.
pub fn train_setup(batch: &SeriesBatch) -> Result<TrainSetup> {
    train_setup_with(&Preprocessor::default(), batch)
}

/// [`train_setup`] with a custom preprocessing configuration
pub fn train_setup_with(preprocessor: &Preprocessor, batch: &SeriesBatch) -> Result<TrainSetup> {
    let prepared = preprocessor.prepare(batch)?;
    let fitted = preprocessor.fit_prepared(&prepared)?;
    let frame = fitted.transform_prepared(&prepared)?;

    let excluded = exclude_other(batch, &preprocessor.config().exclusion);
    let labels = extract_labels(&excluded)?;

    let (test_idx, train_idx): (Vec<usize>, Vec<usize>) =
        (0..labels.len()).partition(|&i| labels[i].seq_label.is_unknown());
    let pick = |idx: &[usize]| idx.iter().map(|&i| labels[i].clone()).collect::<Vec<_>>();
    let train_labels = pick(&train_idx);
    let test_labels = pick(&test_idx);

    let (label_codes, y) = LabelCodes::factorize(train_labels.iter().map(|l| l.seq_label));

    info!(
        "Training setup: {} labeled series in {} classes, {} unknown held out",
        train_idx.len(),
        label_codes.len(),
        test_idx.len()
    );

    Ok(TrainSetup {
        train: frame.subset(&train_idx),
        test: frame.subset(&test_idx),
        train_labels,
        test_labels,
        y,
        label_codes,
        preprocessor: fitted,
    })
}

/// Fits a random forest on the named features and writes it to `path`
///
/// The model is saved as JSON; reload it with [`RandomForest::load`].
///
/// # Errors
///
/// Returns [`MrseqError::MissingColumn`] for unknown feature names,
/// [`MrseqError::Training`] if the setup has no labeled rows, and I/O or
/// serialization errors from writing the model.
pub fn train_fit(
    setup: &TrainSetup,
    features: &[&str],
    path: impl AsRef<Path>,
    config: &ForestConfig,
) -> Result<RandomForest> {
    if setup.y.is_empty() {
        return Err(MrseqError::Training("no labeled series to train on".to_string()));
    }
    let x = setup.train_matrix(features)?;

    let mut forest = RandomForest::new(config.clone()).with_feature_names(features);
    forest.fit(&x, &setup.y, setup.label_codes.len())?;
    forest.save(path)?;
    Ok(forest)
}
