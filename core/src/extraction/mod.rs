pub mod contrast;
pub mod description;
pub mod geometry;
#[cfg(feature = "dicom")]
pub mod header;
pub mod labels;
pub mod sequence;

pub use contrast::{detect_contrast, detect_record_contrast};
pub use description::rm_extra_info;
pub use geometry::{compute_plane, plane_from_cosines};
pub use labels::{extract_labels, extract_record_labels, series_path, CandidateLabels};
pub use sequence::{
    evaluate_rules, extract_label, extract_record_label, find_seq, sequence_rules, SequenceRule,
};
