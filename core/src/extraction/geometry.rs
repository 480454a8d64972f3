use crate::error::{MrseqError, Result};
use crate::types::fields::{orientation_component, IMAGE_ORIENTATION_PATIENT};
use crate::types::{FieldValue, Plane, SeriesRecord};

/// Computes the imaging plane of a series
///
/// Uses the split columns `ImageOrientationPatient0..5` when the record has
/// them, otherwise the six-element `ImageOrientationPatient` field.
///
/// # Algorithm
///
/// 1. Read the direction cosines `[x1, y1, z1, x2, y2, z2]` of the first row
///    and first column of the pixel data
/// 2. Cross product of the two vectors gives the slice normal
/// 3. The dominant axis of `|normal|` picks the plane: x→sag, y→cor, z→ax
///
/// # Errors
///
/// Returns [`MrseqError::InvalidOrientation`] if there are not exactly six
/// numeric components.
///
/// # Example
///
/// ```
/// use mrseq_core::{extraction::compute_plane, Plane, SeriesRecord};
///
/// let record = SeriesRecord::new()
///     .with("ImageOrientationPatient", vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
/// assert_eq!(compute_plane(&record).unwrap(), Plane::Ax);
/// ```
pub fn compute_plane(record: &SeriesRecord) -> Result<Plane> {
    let dircos = direction_cosines(record)?;
    Ok(plane_from_cosines(&dircos))
}

/// Plane from six direction cosines
///
/// Zero or degenerate vectors are not guarded: ties resolve to the first
/// axis, so an all-zero normal yields `Sag`.
pub fn plane_from_cosines(dircos: &[f64; 6]) -> Plane {
    let row = [dircos[0], dircos[1], dircos[2]];
    let col = [dircos[3], dircos[4], dircos[5]];
    let normal = cross(&row, &col).map(f64::abs);

    let mut axis = 0;
    for i in 1..3 {
        if normal[i] > normal[axis] {
            axis = i;
        }
    }
    Plane::BY_AXIS[axis]
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Reads the six direction cosines from either orientation layout
fn direction_cosines(record: &SeriesRecord) -> Result<[f64; 6]> {
    if record.contains(&orientation_component(1)) {
        let mut dircos = [0.0; 6];
        for (i, slot) in dircos.iter_mut().enumerate() {
            let name = orientation_component(i);
            *slot = record.get(&name).to_f64().ok_or_else(|| {
                MrseqError::InvalidOrientation(format!("{} is not numeric", name))
            })?;
        }
        return Ok(dircos);
    }

    let components = orientation_values(record.get(IMAGE_ORIENTATION_PATIENT))?;
    components.try_into().map_err(|v: Vec<f64>| {
        MrseqError::InvalidOrientation(format!("expected 6 components, found {}", v.len()))
    })
}

/// Flattens an orientation field into numbers
///
/// Accepts a list of numbers (or numeric strings) or a backslash-separated
/// DICOM string.
fn orientation_values(value: &FieldValue) -> Result<Vec<f64>> {
    let non_numeric =
        || MrseqError::InvalidOrientation(format!("non-numeric component in {}", value));

    match value {
        FieldValue::List(items) => items
            .iter()
            .map(|v| v.to_f64().ok_or_else(non_numeric))
            .collect(),
        FieldValue::Text(s) => s
            .split('\\')
            .map(|part| part.trim().parse::<f64>().map_err(|_| non_numeric()))
            .collect(),
        FieldValue::Null => Err(MrseqError::InvalidOrientation(format!(
            "{} is missing",
            IMAGE_ORIENTATION_PATIENT
        ))),
        FieldValue::Number(_) => Err(MrseqError::InvalidOrientation(
            "expected 6 components, found a scalar".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case([1.0, 0.0, 0.0, 0.0, 1.0, 0.0], Plane::Ax)]
    #[case([1.0, 0.0, 0.0, 0.0, 0.0, -1.0], Plane::Cor)]
    #[case([0.0, 1.0, 0.0, 0.0, 0.0, -1.0], Plane::Sag)]
    #[case([0.999, 0.035, 0.0, -0.03, 0.94, -0.34], Plane::Ax)]
    fn test_plane_from_cosines(#[case] dircos: [f64; 6], #[case] expected: Plane) {
        assert_eq!(plane_from_cosines(&dircos), expected);
    }

    #[test]
    fn test_zero_vector_resolves_to_first_axis() {
        assert_eq!(plane_from_cosines(&[0.0; 6]), Plane::Sag);
    }

    #[test]
    fn test_compute_plane_from_list() {
        let record = SeriesRecord::new()
            .with(IMAGE_ORIENTATION_PATIENT, vec![1.0, 0.0, 0.0, 0.0, 0.0, -1.0]);
        assert_eq!(compute_plane(&record).unwrap(), Plane::Cor);
    }

    #[test]
    fn test_compute_plane_from_split_columns() {
        let values = [0.0, 1.0, 0.0, 0.0, 0.0, -1.0];
        let mut record = SeriesRecord::new();
        for (i, v) in values.iter().enumerate() {
            record.set(&orientation_component(i), *v);
        }
        assert_eq!(compute_plane(&record).unwrap(), Plane::Sag);
    }

    #[test]
    fn test_split_columns_take_precedence() {
        let mut record = SeriesRecord::new()
            .with(IMAGE_ORIENTATION_PATIENT, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        for (i, v) in [0.0, 1.0, 0.0, 0.0, 0.0, -1.0].iter().enumerate() {
            record.set(&orientation_component(i), *v);
        }
        assert_eq!(compute_plane(&record).unwrap(), Plane::Sag);
    }

    #[test]
    fn test_compute_plane_from_dicom_string() {
        let record = SeriesRecord::new().with(IMAGE_ORIENTATION_PATIENT, "1\\0\\0\\0\\1\\0");
        assert_eq!(compute_plane(&record).unwrap(), Plane::Ax);
    }

    #[test]
    fn test_wrong_length_is_error() {
        let record =
            SeriesRecord::new().with(IMAGE_ORIENTATION_PATIENT, vec![1.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(matches!(
            compute_plane(&record),
            Err(MrseqError::InvalidOrientation(_))
        ));
    }

    #[test]
    fn test_non_numeric_is_error() {
        let record = SeriesRecord::new().with(
            IMAGE_ORIENTATION_PATIENT,
            vec!["1", "0", "x", "0", "1", "0"],
        );
        assert!(compute_plane(&record).is_err());

        let record = SeriesRecord::new();
        assert!(compute_plane(&record).is_err());
    }
}
