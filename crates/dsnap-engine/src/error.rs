use dsnap_dom::DomError;
use dsnap_report::ReportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid snapshot reference: {0}")]
    InvalidSnapshotReference(String),

    #[error("serialization failed: {0}")]
    SerializationFailure(#[from] DomError),

    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("report error: {0}")]
    Report(ReportError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<ReportError> for EngineError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::UnsupportedFormat(name) => EngineError::UnsupportedFormat(name),
            other => EngineError::Report(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
