use dsnap_diff::{Change, ChangeSummary, DiffResult};
use dsnap_types::SnapshotInfo;
use serde::Serialize;

use crate::error::{ReportError, ReportResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiffReport<'a> {
    before: SnapshotInfo,
    after: SnapshotInfo,
    summary: &'a ChangeSummary,
    changes: &'a [Change],
    elapsed_ms: f64,
}

/// Render a diff as pretty-printed JSON.
pub fn render_json(diff: &DiffResult) -> ReportResult<String> {
    let report = DiffReport {
        before: diff.before.info(),
        after: diff.after.info(),
        summary: &diff.summary,
        changes: &diff.changes,
        elapsed_ms: diff.elapsed.as_secs_f64() * 1000.0,
    };
    serde_json::to_string_pretty(&report).map_err(|e| ReportError::Serialization(e.to_string()))
}
