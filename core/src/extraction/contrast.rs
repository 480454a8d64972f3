use crate::error::Result;
use crate::types::fields::{CONTRAST_BOLUS_AGENT, SERIES_DESCRIPTION};
use crate::types::{FieldValue, SeriesRecord};
use regex::Regex;
use std::sync::OnceLock;

fn contrast_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(\+-?c|post)").expect("Failed to compile regex"))
}

/// Detects contrast enhancement from description text and bolus agent
///
/// Returns 1 if the lower-cased description contains "+c", "+-c" or "post",
/// or if the agent is a string. A null, numeric or absent agent contributes
/// nothing.
pub fn detect_contrast(description: &str, agent: &FieldValue) -> u8 {
    if contrast_regex().is_match(&description.to_lowercase()) {
        return 1;
    }
    u8::from(agent.is_text())
}

/// Contrast flag of a record
///
/// # Errors
///
/// Returns [`MissingText`](crate::MrseqError::MissingText) if the
/// SeriesDescription is not a string.
pub fn detect_record_contrast(record: &SeriesRecord) -> Result<u8> {
    let description = record.require_text(SERIES_DESCRIPTION)?;
    Ok(detect_contrast(description, record.get(CONTRAST_BOLUS_AGENT)))
}
