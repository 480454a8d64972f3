//! Field names of a flattened series header row

// Identification
pub const FNAME: &str = "fname";
pub const SERIES_DESCRIPTION: &str = "SeriesDescription";
pub const BODY_PART_EXAMINED: &str = "BodyPartExamined";
pub const SOP_CLASS_UID: &str = "SOPClassUID";

// Geometry
pub const IMAGE_ORIENTATION_PATIENT: &str = "ImageOrientationPatient";
pub const PIXEL_SPACING: &str = "PixelSpacing";
pub const SLICE_THICKNESS: &str = "SliceThickness";

// Sequence codes (multi-valued)
pub const SCANNING_SEQUENCE: &str = "ScanningSequence";
pub const SEQUENCE_VARIANT: &str = "SequenceVariant";
pub const SCAN_OPTIONS: &str = "ScanOptions";

// Acquisition
pub const MR_ACQUISITION_TYPE: &str = "MRAcquisitionType";
pub const ANGIO_FLAG: &str = "AngioFlag";
pub const CONTRAST_BOLUS_AGENT: &str = "ContrastBolusAgent";
pub const DIFFUSION_B_VALUE: &str = "DiffusionBValue";
pub const REPETITION_TIME: &str = "RepetitionTime";
pub const ECHO_TIME: &str = "EchoTime";
pub const ECHO_TRAIN_LENGTH: &str = "EchoTrainLength";
pub const INVERSION_TIME: &str = "InversionTime";

/// Name of the n-th split orientation column (`ImageOrientationPatient0`..`5`)
pub fn orientation_component(index: usize) -> String {
    format!("{}{}", IMAGE_ORIENTATION_PATIENT, index)
}
