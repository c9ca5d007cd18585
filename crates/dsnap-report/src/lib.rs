//! Diff rendering for dsnap.
//!
//! A [`DiffResult`](dsnap_diff::DiffResult) renders as structured data
//! ([`ReportFormat::Json`]) or as a long-form human-readable report
//! ([`ReportFormat::Text`]). Both carry the snapshot labels and timestamps,
//! per-kind counts, every change, and the time the diff took.

pub mod error;
pub mod format;
pub mod json;
pub mod text;

use dsnap_diff::DiffResult;

pub use error::{ReportError, ReportResult};
pub use format::ReportFormat;

/// Render a diff in the format named by `format`.
///
/// Fails with [`ReportError::UnsupportedFormat`] for unrecognized names.
pub fn render(diff: &DiffResult, format: &str) -> ReportResult<String> {
    render_as(diff, format.parse()?)
}

/// Render a diff in an already-parsed format.
pub fn render_as(diff: &DiffResult, format: ReportFormat) -> ReportResult<String> {
    match format {
        ReportFormat::Json => json::render_json(diff),
        ReportFormat::Text => Ok(text::render_text(diff)),
    }
}
