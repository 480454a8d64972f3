//! Column lists and the closed feature vocabulary
//!
//! `FEATURES` is the fixed schema of every preprocessed frame. Single
//! character codes (`seq_S`, `var_N`, `opt__`, ...) come from scalar code
//! strings expanded per character; see [`CodeSplitting`](crate::CodeSplitting).

use crate::types::fields::*;

/// Columns projected from the excluded batch before encoding
pub const KEEP: &[&str] = &[
    FNAME,
    SERIES_DESCRIPTION,
    IMAGE_ORIENTATION_PATIENT,
    SCANNING_SEQUENCE,
    SEQUENCE_VARIANT,
    SCAN_OPTIONS,
    MR_ACQUISITION_TYPE,
    ANGIO_FLAG,
    SLICE_THICKNESS,
    REPETITION_TIME,
    ECHO_TIME,
    ECHO_TRAIN_LENGTH,
    PIXEL_SPACING,
    CONTRAST_BOLUS_AGENT,
    INVERSION_TIME,
    DIFFUSION_B_VALUE,
];

/// Multi-valued code columns and their one-hot prefixes
pub const DUMMIES: &[(&str, &str)] = &[
    (SCANNING_SEQUENCE, "seq"),
    (SEQUENCE_VARIANT, "var"),
    (SCAN_OPTIONS, "opt"),
];

/// Columns recoded to {0, 1}
pub const BINARIZE: &[&str] = &[
    MR_ACQUISITION_TYPE,
    ANGIO_FLAG,
    CONTRAST_BOLUS_AGENT,
    DIFFUSION_B_VALUE,
];

/// Continuous columns min-max rescaled to [0, 1]
pub const RESCALE: &[&str] = &[
    SLICE_THICKNESS,
    REPETITION_TIME,
    ECHO_TIME,
    ECHO_TRAIN_LENGTH,
    PIXEL_SPACING,
    INVERSION_TIME,
];

/// Placeholder code for a missing multi-valued field
pub const NONE_CODE: &str = "NONE";

/// The closed feature vocabulary, in output column order
pub const FEATURES: &[&str] = &[
    "MRAcquisitionType", "AngioFlag", "SliceThickness", "RepetitionTime",
    "EchoTime", "EchoTrainLength", "PixelSpacing", "ContrastBolusAgent",
    "InversionTime", "DiffusionBValue", "seq_E", "seq_EP", "seq_G",
    "seq_GR", "seq_I", "seq_IR", "seq_M", "seq_P", "seq_R", "seq_S",
    "seq_SE", "var_E", "var_K", "var_MP", "var_MTC", "var_N", "var_O",
    "var_OSP", "var_P", "var_S", "var_SK", "var_SP", "var_SS", "var_TOF",
    "opt_1", "opt_2", "opt_A", "opt_ACC_GEMS", "opt_B", "opt_C", "opt_D",
    "opt_E", "opt_EDR_GEMS", "opt_EPI_GEMS", "opt_F", "opt_FAST_GEMS",
    "opt_FC", "opt_FC_FREQ_AX_GEMS", "opt_FC_SLICE_AX_GEMS",
    "opt_FILTERED_GEMS", "opt_FR_GEMS", "opt_FS", "opt_FSA_GEMS",
    "opt_FSI_GEMS", "opt_FSL_GEMS", "opt_FSP_GEMS", "opt_FSS_GEMS", "opt_G",
    "opt_I", "opt_IFLOW_GEMS", "opt_IR", "opt_IR_GEMS", "opt_L", "opt_M",
    "opt_MP_GEMS", "opt_MT", "opt_MT_GEMS", "opt_NPW", "opt_P", "opt_PFF",
    "opt_PFP", "opt_PROP_GEMS", "opt_R", "opt_RAMP_IS_GEMS", "opt_S",
    "opt_SAT1", "opt_SAT2", "opt_SAT_GEMS", "opt_SEQ_GEMS", "opt_SP",
    "opt_T", "opt_T2FLAIR_GEMS", "opt_TRF_GEMS", "opt_VASCTOF_GEMS",
    "opt_VB_GEMS", "opt_W", "opt_X", "opt__",
];

/// Name of a one-hot indicator column
pub fn dummy_column(prefix: &str, code: &str) -> String {
    format!("{}_{}", prefix, code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_feature_vocabulary_is_closed_and_unique() {
        assert_eq!(FEATURES.len(), 88);
        let unique: HashSet<&str> = FEATURES.iter().copied().collect();
        assert_eq!(unique.len(), FEATURES.len());
    }

    #[test]
    fn test_encoded_columns_are_features() {
        for col in BINARIZE.iter().chain(RESCALE) {
            assert!(FEATURES.contains(col), "{} missing from FEATURES", col);
        }
    }

    #[test]
    fn test_dummy_prefixes_cover_vocabulary() {
        let prefixed = FEATURES
            .iter()
            .filter(|f| DUMMIES.iter().any(|(_, p)| f.starts_with(&format!("{}_", p))))
            .count();
        assert_eq!(prefixed, FEATURES.len() - BINARIZE.len() - RESCALE.len());
    }

    #[test]
    fn test_dummy_column() {
        assert_eq!(dummy_column("opt", "_"), "opt__");
        assert_eq!(dummy_column("seq", "SE"), "seq_SE");
    }
}
