use thiserror::Error;

/// Result type for mrseq operations
pub type Result<T> = std::result::Result<T, MrseqError>;

/// Error types for mrseq operations
///
/// Every error is fatal for the batch being processed; no step returns a
/// partial result.
#[derive(Error, Debug)]
pub enum MrseqError {
    /// Column not present in the batch or frame
    #[error("Column not found: {0}")]
    MissingColumn(String),

    /// A required text field was null or not a string
    #[error("Missing required text field: {0}")]
    MissingText(String),

    /// ImageOrientationPatient has the wrong shape or non-numeric components
    #[error("Invalid orientation: {0}")]
    InvalidOrientation(String),

    /// Field value has a type the step cannot handle
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Classifier fitting error
    #[error("Training error: {0}")]
    Training(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Helper conversions
impl From<String> for MrseqError {
    fn from(s: String) -> Self {
        MrseqError::InvalidValue(s)
    }
}

impl From<&str> for MrseqError {
    fn from(s: &str) -> Self {
        MrseqError::InvalidValue(s.to_string())
    }
}
