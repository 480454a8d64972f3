use crate::types::fields::{BODY_PART_EXAMINED, SOP_CLASS_UID};
use crate::types::{ExclusionFilter, SeriesBatch};
use log::debug;

/// Drops series that should not be classified
///
/// # Algorithm
///
/// 1. Drop records whose BodyPartExamined is excluded (absent body part is kept)
/// 2. Keep only records whose SOPClassUID is accepted (absent SOP class is dropped)
///
/// Record order is preserved. Never fails: fields that are missing or not
/// strings simply do not match.
///
/// # Example
///
/// ```
/// use mrseq_core::{selection::exclude_other, ExclusionFilter, SeriesBatch, SeriesRecord};
///
/// let batch = SeriesBatch::new(vec![
///     SeriesRecord::new()
///         .with("BodyPartExamined", "SPINE")
///         .with("SOPClassUID", "MR Image Storage"),
///     SeriesRecord::new()
///         .with("BodyPartExamined", "BRAIN")
///         .with("SOPClassUID", "MR Image Storage"),
/// ]);
///
/// let kept = exclude_other(&batch, &ExclusionFilter::default());
/// assert_eq!(kept.len(), 1);
/// ```
pub fn exclude_other(batch: &SeriesBatch, filter: &ExclusionFilter) -> SeriesBatch {
    let other =
        batch.filter(|r| !filter.is_excluded_body_part(r.get(BODY_PART_EXAMINED).as_text()));
    let kept = other.filter(|r| filter.is_allowed_sop_class(r.get(SOP_CLASS_UID).as_text()));

    debug!(
        "Exclusion: {} records in, {} after body part, {} after SOP class",
        batch.len(),
        other.len(),
        kept.len()
    );
    kept
}
