/// Errors from rendering a diff.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReportError {
    /// The requested export format is not recognized.
    #[error("unsupported export format: {0:?}")]
    UnsupportedFormat(String),

    /// Structured output could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for report results.
pub type ReportResult<T> = Result<T, ReportError>;
