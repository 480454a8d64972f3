use crate::error::Result;
use crate::features::{continuous_values, BinaryPolicy, MinMaxScaler, MultiLabelBinarizer};
use crate::selection::exclude_other;
use crate::types::fields::{FNAME, PIXEL_SPACING, SERIES_DESCRIPTION};
use crate::types::{
    FeatureFrame, FieldValue, PixelSpacing, PreprocessConfig, RowIdentity, SeriesBatch,
    SeriesRecord,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Main entry point for turning series header rows into features
///
/// Fitting learns the per-column binary policies and the min-max ranges;
/// the returned [`FittedPreprocessor`] applies them to any batch.
///
/// # Example
///
/// ```
/// use mrseq_core::{Preprocessor, SeriesBatch, SeriesRecord, FEATURES};
///
/// let record = SeriesRecord::new()
///     .with("fname", "/data/s1/IM1.dcm")
///     .with("SeriesDescription", "AX T2 FLAIR")
///     .with("BodyPartExamined", "BRAIN")
///     .with("SOPClassUID", "MR Image Storage")
///     .with("ImageOrientationPatient", vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
///     .with("ScanningSequence", vec!["SE", "IR"])
///     .with("SequenceVariant", vec!["SK", "SP"])
///     .with("ScanOptions", "FC")
///     .with("MRAcquisitionType", "2D")
///     .with("AngioFlag", "N")
///     .with("SliceThickness", 5.0)
///     .with("RepetitionTime", 9000.0)
///     .with("EchoTime", 120.0)
///     .with("EchoTrainLength", 24.0)
///     .with("PixelSpacing", vec![0.43, 0.43])
///     .with("ContrastBolusAgent", None::<&str>)
///     .with("InversionTime", 2500.0)
///     .with("DiffusionBValue", None::<f64>);
/// let batch = SeriesBatch::new(vec![record]);
///
/// let fitted = Preprocessor::default().fit(&batch).unwrap();
/// let frame = fitted.transform(&batch).unwrap();
///
/// assert_eq!(frame.n_rows(), 1);
/// assert_eq!(frame.n_columns(), FEATURES.len());
/// assert_eq!(frame.get(0, "seq_IR").unwrap(), 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Exclusion, projection and pixel-spacing reduction
    ///
    /// The returned batch still holds raw header values; label extraction
    /// runs on it.
    ///
    /// # Errors
    ///
    /// Returns [`MissingColumn`](crate::MrseqError::MissingColumn) if a kept
    /// column is absent and [`InvalidValue`](crate::MrseqError::InvalidValue)
    /// for unreadable pixel spacing.
    pub fn prepare(&self, batch: &SeriesBatch) -> Result<SeriesBatch> {
        let kept = exclude_other(batch, &self.config.exclusion);
        let projected = kept.project(&self.config.keep)?;

        if !self.config.keep.iter().any(|k| k == PIXEL_SPACING) {
            return Ok(projected);
        }

        let records = projected
            .iter()
            .map(|record| -> Result<SeriesRecord> {
                let mut record = record.clone();
                let spacing = PixelSpacing::from_field(record.get(PIXEL_SPACING))?;
                record.set(PIXEL_SPACING, spacing.map(|s| s.row));
                Ok(record)
            })
            .collect::<Result<Vec<SeriesRecord>>>()?;
        Ok(SeriesBatch::new(records))
    }

    /// Learns encoding state from a batch
    pub fn fit(&self, batch: &SeriesBatch) -> Result<FittedPreprocessor> {
        self.fit_prepared(&self.prepare(batch)?)
    }

    /// Fits on a batch and transforms that same batch
    ///
    /// This is the per-call behavior: statistics depend on the batch passed
    /// in, so different batches are not encoded consistently.
    pub fn fit_transform(&self, batch: &SeriesBatch) -> Result<FeatureFrame> {
        let prepared = self.prepare(batch)?;
        self.fit_prepared(&prepared)?.transform_prepared(&prepared)
    }

    pub(crate) fn fit_prepared(&self, prepared: &SeriesBatch) -> Result<FittedPreprocessor> {
        if prepared.is_empty() {
            warn!("Fitting preprocessor on an empty batch");
        }

        let binary = self
            .config
            .binarize
            .iter()
            .map(|name| Ok((name.clone(), BinaryPolicy::fit(&prepared.column(name)?))))
            .collect::<Result<Vec<_>>>()?;

        let continuous = self
            .config
            .rescale
            .iter()
            .map(|name| Ok((name.clone(), continuous_values(name, &prepared.column(name)?)?)))
            .collect::<Result<Vec<_>>>()?;

        for (name, policy) in &binary {
            debug!("Binary policy for {}: {:?}", name, policy);
        }

        Ok(FittedPreprocessor {
            config: self.config.clone(),
            binary,
            scaler: MinMaxScaler::fit(&continuous, self.config.clip),
        })
    }
}

/// Preprocessing state fit on one batch, reusable on others
///
/// Serializable so the state learned on a training corpus can be stored
/// next to the model and reloaded for inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    config: PreprocessConfig,
    binary: Vec<(String, BinaryPolicy)>,
    scaler: MinMaxScaler,
}

impl FittedPreprocessor {
    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Binary policy learned for a column
    pub fn binary_policy(&self, name: &str) -> Option<&BinaryPolicy> {
        self.binary.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    /// Encodes a batch into the closed feature schema
    ///
    /// The output has exactly the configured feature columns, in order,
    /// with no missing values.
    pub fn transform(&self, batch: &SeriesBatch) -> Result<FeatureFrame> {
        let prepared = Preprocessor::new(self.config.clone()).prepare(batch)?;
        self.transform_prepared(&prepared)
    }

    pub(crate) fn transform_prepared(&self, prepared: &SeriesBatch) -> Result<FeatureFrame> {
        let config = &self.config;
        let mut columns: HashMap<String, Vec<f64>> = HashMap::new();

        for dummy in &config.dummies {
            let values = prepared.column(&dummy.column)?;
            let mlb = MultiLabelBinarizer::from_vocabulary(
                &dummy.prefix,
                &config.features,
                config.code_splitting,
            );
            let (indicators, _dropped) = mlb.transform(&values);
            columns.extend(indicators);
        }

        for (name, policy) in &self.binary {
            let values = prepared.column(name)?;
            columns.insert(name.clone(), policy.encode_column(&values));
        }

        for name in self.scaler.columns() {
            let values = continuous_values(name, &prepared.column(name)?)?;
            columns.insert(name.to_string(), self.scaler.transform_column(name, &values)?);
        }

        let zero_filled: Vec<&String> = config
            .features
            .iter()
            .filter(|f| !columns.contains_key(f.as_str()))
            .collect();
        if !zero_filled.is_empty() {
            debug!("Zero-filling {} features: {:?}", zero_filled.len(), zero_filled);
        }

        let mut frame = FeatureFrame::new(config.features.clone());
        for (row, record) in prepared.iter().enumerate() {
            let values = config
                .features
                .iter()
                .map(|f| columns.get(f).map_or(0.0, |c| c[row]))
                .collect();
            frame.push_row(values, row_identity(record))?;
        }

        info!(
            "Preprocessed {} series into {} features",
            frame.n_rows(),
            frame.n_columns()
        );
        Ok(frame)
    }

    /// Writes the fitted state as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, self)?;
        info!("Saved preprocessing state to {}", path.as_ref().display());
        Ok(())
    }

    /// Reads fitted state written by [`FittedPreprocessor::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }
}

fn row_identity(record: &SeriesRecord) -> RowIdentity {
    let text = |v: &FieldValue| v.as_text().map(str::to_string);
    RowIdentity {
        fname: text(record.get(FNAME)),
        series_description: text(record.get(SERIES_DESCRIPTION)),
    }
}

/// Per-call preprocessing with the default configuration
///
/// Equivalent to `Preprocessor::default().fit_transform(batch)`.
pub fn preprocess(batch: &SeriesBatch) -> Result<FeatureFrame> {
    Preprocessor::default().fit_transform(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MrseqError;
    use crate::extraction::extract_labels;
    use crate::features::FEATURES;
    use crate::types::{Plane, SeqLabel};
    use crate::types::fields::*;
    use crate::types::MR_IMAGE_STORAGE;

    fn brain(description: &str) -> SeriesRecord {
        SeriesRecord::new()
            .with(FNAME, "/data/st1/se1/IM1.dcm")
            .with(SERIES_DESCRIPTION, description)
            .with(BODY_PART_EXAMINED, "BRAIN")
            .with(SOP_CLASS_UID, MR_IMAGE_STORAGE)
            .with(IMAGE_ORIENTATION_PATIENT, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
            .with(SCANNING_SEQUENCE, vec!["SE", "IR"])
            .with(SEQUENCE_VARIANT, "SK")
            .with(SCAN_OPTIONS, FieldValue::Null)
            .with(MR_ACQUISITION_TYPE, "2D")
            .with(ANGIO_FLAG, "N")
            .with(SLICE_THICKNESS, 5.0)
            .with(REPETITION_TIME, 9000.0)
            .with(ECHO_TIME, 120.0)
            .with(ECHO_TRAIN_LENGTH, 24.0)
            .with(PIXEL_SPACING, vec![0.5, 0.5])
            .with(CONTRAST_BOLUS_AGENT, FieldValue::Null)
            .with(INVERSION_TIME, 2500.0)
            .with(DIFFUSION_B_VALUE, FieldValue::Null)
    }

    fn mixed_batch() -> SeriesBatch {
        SeriesBatch::new(vec![
            brain("AX T2 FLAIR"),
            brain("SAG T1 POST")
                .with(ECHO_TIME, 10.0)
                .with(REPETITION_TIME, 500.0)
                .with(CONTRAST_BOLUS_AGENT, "GADAVIST")
                .with(MR_ACQUISITION_TYPE, "3D")
                .with(PIXEL_SPACING, "1.0\\1.0")
                .with(SCAN_OPTIONS, vec!["FS", "SAT2"]),
            brain("AX DWI")
                .with(ECHO_TIME, 65.0)
                .with(INVERSION_TIME, FieldValue::Null)
                .with(DIFFUSION_B_VALUE, 1000.0),
        ])
    }

    #[test]
    fn test_schema_closure() {
        let frame = preprocess(&mixed_batch()).unwrap();
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.columns(), FEATURES);
        assert!(!frame.has_nulls());
        assert!(frame.rows().iter().flatten().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_minimal_batch_zero_fills() {
        let frame = preprocess(&SeriesBatch::new(vec![brain("AX T2")])).unwrap();
        assert_eq!(frame.n_columns(), 88);
        assert_eq!(frame.get(0, "opt_FAST_GEMS").unwrap(), 0.0);
        assert_eq!(frame.get(0, "var_TOF").unwrap(), 0.0);
        // single row: every continuous value sits at the bottom of its range
        assert_eq!(frame.get(0, ECHO_TIME).unwrap(), 0.0);
    }

    #[test]
    fn test_encodings() {
        let frame = preprocess(&mixed_batch()).unwrap();

        // dummies: lists by element, strings by character, null as NONE
        assert_eq!(frame.column("seq_SE").unwrap(), vec![1.0, 1.0, 1.0]);
        assert_eq!(frame.column("var_S").unwrap(), vec![1.0, 1.0, 1.0]);
        assert_eq!(frame.column("var_K").unwrap(), vec![1.0, 1.0, 1.0]);
        assert_eq!(frame.column("opt_FS").unwrap(), vec![0.0, 1.0, 0.0]);
        assert_eq!(frame.column("opt_SAT2").unwrap(), vec![0.0, 1.0, 0.0]);
        assert_eq!(frame.column("opt_E").unwrap(), vec![1.0, 0.0, 1.0]);

        // binary: no nulls -> reference to first row; nulls -> presence
        assert_eq!(frame.column(MR_ACQUISITION_TYPE).unwrap(), vec![0.0, 1.0, 0.0]);
        assert_eq!(frame.column(ANGIO_FLAG).unwrap(), vec![0.0, 0.0, 0.0]);
        assert_eq!(frame.column(CONTRAST_BOLUS_AGENT).unwrap(), vec![0.0, 1.0, 0.0]);
        assert_eq!(frame.column(DIFFUSION_B_VALUE).unwrap(), vec![0.0, 0.0, 1.0]);

        // rescale: min-max over the batch, missing -> 0
        assert_eq!(frame.column(ECHO_TIME).unwrap(), vec![1.0, 0.0, 0.5]);
        assert_eq!(frame.column(INVERSION_TIME).unwrap(), vec![0.0, 0.0, 0.0]);
        assert_eq!(frame.column(PIXEL_SPACING).unwrap(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_deterministic() {
        let batch = mixed_batch();
        assert_eq!(preprocess(&batch).unwrap(), preprocess(&batch).unwrap());
    }

    #[test]
    fn test_fitted_state_matches_fit_transform() {
        let batch = mixed_batch();
        let fitted = Preprocessor::default().fit(&batch).unwrap();
        assert_eq!(fitted.transform(&batch).unwrap(), preprocess(&batch).unwrap());
    }

    #[test]
    fn test_fitted_state_reused_on_new_batch() {
        let fitted = Preprocessor::default().fit(&mixed_batch()).unwrap();
        let single = SeriesBatch::new(vec![brain("AX T2").with(ECHO_TIME, 200.0)]);

        let reused = fitted.transform(&single).unwrap();
        let refit = preprocess(&single).unwrap();

        // reused scaler clips to the training range; refitting collapses to 0
        assert_eq!(reused.get(0, ECHO_TIME).unwrap(), 1.0);
        assert_eq!(refit.get(0, ECHO_TIME).unwrap(), 0.0);
        assert_eq!(
            fitted.binary_policy(MR_ACQUISITION_TYPE),
            Some(&BinaryPolicy::Reference(FieldValue::from("2D")))
        );
    }

    #[test]
    fn test_exclusion_end_to_end() {
        let batch = SeriesBatch::new(vec![
            brain("SAG T2").with(BODY_PART_EXAMINED, "SPINE"),
            brain("SAG T1").with(BODY_PART_EXAMINED, "CSPINE"),
            brain("AX T1 POST"),
        ]);
        let frame = preprocess(&batch).unwrap();
        assert_eq!(frame.n_rows(), 1);
        assert_eq!(
            frame.identities()[0].series_description.as_deref(),
            Some("AX T1 POST")
        );

        let kept = exclude_other(&batch, &Preprocessor::default().config().exclusion);
        let labels = extract_labels(&kept).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].plane, Plane::Ax);
        assert_eq!(labels[0].seq_label, SeqLabel::T1);
        assert_eq!(labels[0].contrast, 1);
    }

    #[test]
    fn test_unreadable_pixel_spacing_is_invalid_value() {
        let batch = SeriesBatch::new(vec![brain("AX T1").with(PIXEL_SPACING, vec!["wide"])]);
        let err = preprocess(&batch).unwrap_err();
        assert!(matches!(err, MrseqError::InvalidValue(ref m) if m.contains("PixelSpacing")));
    }

    #[test]
    fn test_non_finite_continuous_never_reaches_frame() {
        for bad in [FieldValue::from("NaN"), FieldValue::from("inf")] {
            let batch = SeriesBatch::new(vec![
                brain("AX T1").with(ECHO_TIME, 10.0),
                brain("AX T2").with(ECHO_TIME, bad),
                brain("AX FLAIR").with(ECHO_TIME, 20.0),
            ]);
            assert!(matches!(preprocess(&batch), Err(MrseqError::InvalidValue(_))));
        }

        let fitted = Preprocessor::default()
            .fit(&SeriesBatch::new(vec![
                brain("AX T1").with(ECHO_TIME, 10.0),
                brain("AX T2").with(ECHO_TIME, 20.0),
            ]))
            .unwrap();
        let batch = SeriesBatch::new(vec![brain("AX T1").with(ECHO_TIME, f64::INFINITY)]);
        assert!(fitted.transform(&batch).is_err());

        let frame = preprocess(&SeriesBatch::new(vec![
            brain("AX T1").with(ECHO_TIME, 10.0),
            brain("AX T2").with(ECHO_TIME, f64::NAN),
            brain("AX FLAIR").with(ECHO_TIME, 20.0),
        ]))
        .unwrap();
        assert!(!frame.has_nulls());
        assert_eq!(frame.column(ECHO_TIME).unwrap(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_missing_column_is_error() {
        let full = brain("x");
        let record: SeriesRecord = full
            .keys()
            .filter(|k| *k != ECHO_TRAIN_LENGTH)
            .map(|k| (k, full.get(k).clone()))
            .collect();
        let err = preprocess(&SeriesBatch::new(vec![record])).unwrap_err();
        assert!(matches!(err, MrseqError::MissingColumn(ref c) if c == ECHO_TRAIN_LENGTH));
    }

    #[test]
    fn test_non_numeric_continuous_is_error() {
        let batch = SeriesBatch::new(vec![brain("x").with(ECHO_TIME, "long")]);
        assert!(matches!(preprocess(&batch), Err(MrseqError::InvalidValue(_))));
    }

    #[test]
    fn test_empty_after_exclusion() {
        let batch = SeriesBatch::new(vec![brain("x").with(BODY_PART_EXAMINED, "SPINE")]);
        let frame = preprocess(&batch).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.n_columns(), 88);
    }

    #[test]
    fn test_input_batch_not_mutated() {
        let batch = mixed_batch();
        let before = batch.clone();
        preprocess(&batch).unwrap();
        assert_eq!(batch, before);
    }

    #[test]
    fn test_save_and_load_state() {
        let fitted = Preprocessor::default().fit(&mixed_batch()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preproc.json");

        fitted.save(&path).unwrap();
        let loaded = FittedPreprocessor::load(&path).unwrap();

        assert_eq!(loaded, fitted);
    }
}
