//! Core type definitions for series metadata
//!
//! This module provides the fundamental types used throughout the mrseq library:
//! - [`FieldValue`]: A flattened DICOM header value (null, number, text, list)
//! - [`SeriesRecord`] / [`SeriesBatch`]: One header row per series, and batches of them
//! - [`Plane`]: Anatomical imaging plane (sag, cor, ax)
//! - [`SeqLabel`]: Weak sequence-type label vocabulary
//! - [`ExclusionFilter`]: Which series are dropped before preprocessing
//! - [`PreprocessConfig`]: Column lists, feature vocabulary and encoding options
//! - [`FeatureFrame`]: The fixed-schema numeric output of preprocessing

mod config;
mod enums;
pub mod fields;
mod filter;
mod frame;
mod pixel_spacing;
mod record;
mod value;

pub use config::{CodeSplitting, DummyColumn, PreprocessConfig};
pub use enums::{Plane, SeqLabel};
pub use filter::{ExclusionFilter, MR_IMAGE_STORAGE, MR_IMAGE_STORAGE_UID};
pub use frame::{FeatureFrame, RowIdentity};
pub use pixel_spacing::PixelSpacing;
pub use record::{SeriesBatch, SeriesRecord};
pub use value::FieldValue;
