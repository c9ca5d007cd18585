use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Export format for a diff report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Structured data (pretty-printed JSON).
    Json,
    /// Human-readable long form.
    Text,
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "structured" => Ok(ReportFormat::Json),
            "text" | "long" => Ok(ReportFormat::Text),
            _ => Err(ReportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Json => f.write_str("json"),
            ReportFormat::Text => f.write_str("text"),
        }
    }
}
