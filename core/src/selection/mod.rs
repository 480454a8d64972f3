//! Series selection ahead of preprocessing
//!
//! Removes series that are out of scope for sequence classification
//! (spine studies, non-MR objects).

mod exclusion;

pub use exclusion::exclude_other;
