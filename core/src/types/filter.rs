use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// SOP class keyword as written by header extractors
pub const MR_IMAGE_STORAGE: &str = "MR Image Storage";

/// SOP class UID of MR Image Storage
pub const MR_IMAGE_STORAGE_UID: &str = "1.2.840.10008.5.1.4.1.1.4";

/// Configuration for excluding series records before preprocessing
///
/// All filters use hard exclusion. Body-part exclusion runs before the SOP
/// class check.
///
/// # Example
///
/// ```
/// use mrseq_core::ExclusionFilter;
///
/// let filter = ExclusionFilter::default().exclude_body_part("LSPINE");
///
/// assert!(filter.excluded_body_parts.contains("SPINE"));
/// assert!(filter.excluded_body_parts.contains("LSPINE"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionFilter {
    /// BodyPartExamined values whose series are dropped
    pub excluded_body_parts: BTreeSet<String>,

    /// SOPClassUID values that are kept; everything else is dropped
    pub allowed_sop_classes: BTreeSet<String>,
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self {
            excluded_body_parts: ["SPINE", "CSPINE"].iter().map(|s| s.to_string()).collect(),
            allowed_sop_classes: [MR_IMAGE_STORAGE, MR_IMAGE_STORAGE_UID]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ExclusionFilter {
    /// Builder: Add a body part to exclude
    pub fn exclude_body_part(mut self, body_part: &str) -> Self {
        self.excluded_body_parts.insert(body_part.to_string());
        self
    }

    /// Builder: Replace the accepted SOP classes
    ///
    /// # Example
    ///
    /// ```
    /// use mrseq_core::ExclusionFilter;
    ///
    /// let filter = ExclusionFilter::default()
    ///     .with_sop_classes(&["1.2.840.10008.5.1.4.1.1.4.1"]);
    /// assert_eq!(filter.allowed_sop_classes.len(), 1);
    /// ```
    pub fn with_sop_classes(mut self, classes: &[&str]) -> Self {
        self.allowed_sop_classes = classes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Returns whether a body part is in the excluded set
    pub fn is_excluded_body_part(&self, body_part: Option<&str>) -> bool {
        body_part.is_some_and(|b| self.excluded_body_parts.contains(b))
    }

    /// Returns whether a SOP class is accepted
    pub fn is_allowed_sop_class(&self, sop_class: Option<&str>) -> bool {
        sop_class.is_some_and(|s| self.allowed_sop_classes.contains(s))
    }
}
