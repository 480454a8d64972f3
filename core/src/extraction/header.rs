//! Projection of a decoded DICOM header into a [`SeriesRecord`]
//!
//! Only reads elements from an in-memory object; opening files is left to
//! the caller.

use crate::types::fields;
use crate::types::{FieldValue, SeriesRecord};
use dicom_core::Tag;
use dicom_object::InMemDicomObject;

// Identification Tags
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const BODY_PART_EXAMINED: Tag = Tag(0x0018, 0x0015);

// Geometry Tags
pub const IMAGE_ORIENTATION_PATIENT: Tag = Tag(0x0020, 0x0037);
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
pub const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);

// Sequence Tags
pub const SCANNING_SEQUENCE: Tag = Tag(0x0018, 0x0020);
pub const SEQUENCE_VARIANT: Tag = Tag(0x0018, 0x0021);
pub const SCAN_OPTIONS: Tag = Tag(0x0018, 0x0022);
pub const MR_ACQUISITION_TYPE: Tag = Tag(0x0018, 0x0023);
pub const ANGIO_FLAG: Tag = Tag(0x0018, 0x0025);

// Timing Tags
pub const REPETITION_TIME: Tag = Tag(0x0018, 0x0080);
pub const ECHO_TIME: Tag = Tag(0x0018, 0x0081);
pub const INVERSION_TIME: Tag = Tag(0x0018, 0x0082);
pub const ECHO_TRAIN_LENGTH: Tag = Tag(0x0018, 0x0091);

// Contrast / Diffusion Tags
pub const CONTRAST_BOLUS_AGENT: Tag = Tag(0x0018, 0x0010);
pub const DIFFUSION_B_VALUE: Tag = Tag(0x0018, 0x9087);

/// String-valued elements
const TEXT_ELEMENTS: &[(&str, Tag)] = &[
    (fields::SOP_CLASS_UID, SOP_CLASS_UID),
    (fields::SERIES_DESCRIPTION, SERIES_DESCRIPTION),
    (fields::BODY_PART_EXAMINED, BODY_PART_EXAMINED),
    (fields::MR_ACQUISITION_TYPE, MR_ACQUISITION_TYPE),
    (fields::ANGIO_FLAG, ANGIO_FLAG),
    (fields::CONTRAST_BOLUS_AGENT, CONTRAST_BOLUS_AGENT),
];

/// Code-string elements that may hold several values
const CODE_ELEMENTS: &[(&str, Tag)] = &[
    (fields::SCANNING_SEQUENCE, SCANNING_SEQUENCE),
    (fields::SEQUENCE_VARIANT, SEQUENCE_VARIANT),
    (fields::SCAN_OPTIONS, SCAN_OPTIONS),
];

/// Numeric elements read as a single float
const NUMERIC_ELEMENTS: &[(&str, Tag)] = &[
    (fields::SLICE_THICKNESS, SLICE_THICKNESS),
    (fields::REPETITION_TIME, REPETITION_TIME),
    (fields::ECHO_TIME, ECHO_TIME),
    (fields::ECHO_TRAIN_LENGTH, ECHO_TRAIN_LENGTH),
    (fields::INVERSION_TIME, INVERSION_TIME),
    (fields::DIFFUSION_B_VALUE, DIFFUSION_B_VALUE),
];

/// Numeric elements read as a list of floats
const VECTOR_ELEMENTS: &[(&str, Tag)] = &[
    (fields::IMAGE_ORIENTATION_PATIENT, IMAGE_ORIENTATION_PATIENT),
    (fields::PIXEL_SPACING, PIXEL_SPACING),
];

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
}

/// Helper to get multi-string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to Vec<String>
pub fn get_multi_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<Vec<String>> {
    dcm.element(tag).ok().and_then(|elem| {
        if let Ok(strs) = elem.to_multi_str() {
            Some(strs.iter().map(|s| s.trim().to_string()).collect())
        } else {
            elem.to_str()
                .ok()
                .map(|s| s.split('\\').map(|part| part.trim().to_string()).collect())
        }
    })
}

/// Helper to get float value from DICOM tag
pub fn get_float_value(dcm: &InMemDicomObject, tag: Tag) -> Option<f64> {
    dcm.element(tag).ok().and_then(|elem| elem.to_float64().ok())
}

/// Helper to get multi-valued float from DICOM tag
pub fn get_multi_float_value(dcm: &InMemDicomObject, tag: Tag) -> Option<Vec<f64>> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_multi_float64().ok())
}

impl SeriesRecord {
    /// Builds a record from a decoded DICOM header
    ///
    /// Absent elements become null fields, so every record produced this way
    /// carries the full set of columns. Single-valued code strings become
    /// `Text`, multi-valued ones a `List` of `Text`.
    ///
    /// # Example
    ///
    /// ```
    /// use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
    /// use dicom_object::InMemDicomObject;
    /// use mrseq_core::SeriesRecord;
    ///
    /// let mut dcm = InMemDicomObject::new_empty();
    /// dcm.put(DataElement::new(
    ///     Tag(0x0008, 0x103E), // SeriesDescription
    ///     VR::LO,
    ///     PrimitiveValue::from("AX T2 FLAIR"),
    /// ));
    ///
    /// let record = SeriesRecord::from_dicom("/data/s1/IM1.dcm", &dcm);
    /// assert_eq!(record.require_text("SeriesDescription").unwrap(), "AX T2 FLAIR");
    /// assert!(record.get("EchoTime").is_null());
    /// ```
    pub fn from_dicom(fname: &str, dcm: &InMemDicomObject) -> SeriesRecord {
        let mut record = SeriesRecord::new().with(fields::FNAME, fname);

        for (name, tag) in TEXT_ELEMENTS {
            record.set(name, get_string_value(dcm, *tag));
        }

        for (name, tag) in CODE_ELEMENTS {
            let value = match get_multi_string_value(dcm, *tag) {
                Some(mut codes) if codes.len() == 1 => FieldValue::Text(codes.remove(0)),
                Some(codes) => FieldValue::from(codes),
                None => FieldValue::Null,
            };
            record.set(name, value);
        }

        for (name, tag) in NUMERIC_ELEMENTS {
            record.set(name, get_float_value(dcm, *tag));
        }

        for (name, tag) in VECTOR_ELEMENTS {
            record.set(name, get_multi_float_value(dcm, *tag));
        }

        record
    }
}
