use super::contrast::detect_contrast;
use super::geometry::compute_plane;
use super::sequence::extract_label;
use crate::error::Result;
use crate::types::fields::{CONTRAST_BOLUS_AGENT, FNAME, SERIES_DESCRIPTION};
use crate::types::{Plane, SeqLabel, SeriesBatch, SeriesRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Candidate labels derived for one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLabels {
    /// Parent directory of the source file, used as the series grouping key
    pub series: PathBuf,

    /// Raw SeriesDescription
    pub description: String,

    /// Imaging plane from ImageOrientationPatient
    pub plane: Plane,

    /// Sequence label from the cleaned description
    pub seq_label: SeqLabel,

    /// 1 if contrast enhanced
    pub contrast: u8,
}

/// Series grouping key of a file path (its parent directory)
///
/// A bare file name yields an empty path.
pub fn series_path(fname: &str) -> PathBuf {
    Path::new(fname)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Derives candidate labels for a single record
///
/// # Errors
///
/// Fails if `fname` or `SeriesDescription` is not a string, or if the
/// orientation cannot be read.
pub fn extract_record_labels(record: &SeriesRecord) -> Result<CandidateLabels> {
    let fname = record.require_text(FNAME)?;
    let description = record.require_text(SERIES_DESCRIPTION)?;

    Ok(CandidateLabels {
        series: series_path(fname),
        description: description.to_string(),
        plane: compute_plane(record)?,
        seq_label: extract_label(description),
        contrast: detect_contrast(description, record.get(CONTRAST_BOLUS_AGENT)),
    })
}

/// Derives candidate labels for every record of a batch, in order
///
/// No record is filtered out; the first failing record fails the batch.
pub fn extract_labels(batch: &SeriesBatch) -> Result<Vec<CandidateLabels>> {
    batch.iter().map(extract_record_labels).collect()
}
