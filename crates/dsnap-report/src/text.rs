use std::fmt::Write;

use chrono::SecondsFormat;
use dsnap_diff::{Change, DiffResult};
use dsnap_types::Snapshot;
use similar::{ChangeTag, TextDiff};

/// Render a diff as a long-form, human-readable report.
pub fn render_text(diff: &DiffResult) -> String {
    let mut out = String::new();
    let s = &diff.summary;

    // Writing into a String cannot fail.
    let _ = writeln!(out, "Snapshot diff");
    let _ = writeln!(out, "=============");
    let _ = writeln!(out, "Before: {}", snapshot_line(&diff.before));
    let _ = writeln!(out, "After:  {}", snapshot_line(&diff.after));
    let _ = writeln!(
        out,
        "Computed in {:.3} ms",
        diff.elapsed.as_secs_f64() * 1000.0
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Summary: {} change(s): {} addition(s), {} deletion(s), {} modification(s), {} move(s)",
        s.total, s.additions, s.deletions, s.modifications, s.moves
    );
    let _ = writeln!(out);

    if diff.changes.is_empty() {
        let _ = writeln!(out, "No changes.");
        return out;
    }

    let _ = writeln!(out, "Changes");
    let _ = writeln!(out, "-------");
    for (i, change) in diff.changes.iter().enumerate() {
        write_change(&mut out, i + 1, change);
    }
    out
}

fn snapshot_line(snapshot: &Snapshot) -> String {
    format!(
        "{} ({}) at {}, {} element(s)",
        snapshot.label,
        snapshot.id,
        snapshot
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        snapshot.element_count
    )
}

fn write_change(out: &mut String, n: usize, change: &Change) {
    match change {
        Change::Addition { path, .. } | Change::Deletion { path, .. } => {
            let _ = writeln!(out, "{n}. [{}] {}", change.kind(), display_path(path));
        }
        Change::Modification { path, property, .. } => {
            let _ = writeln!(
                out,
                "{n}. [{}] {} at {}",
                change.kind(),
                property,
                display_path(path)
            );
        }
        Change::Move {
            from_path, to_path, ..
        } => {
            let _ = writeln!(
                out,
                "{n}. [{}] {} -> {}",
                change.kind(),
                display_path(from_path),
                display_path(to_path)
            );
        }
    }
    let _ = writeln!(out, "   {}", change.description());

    if let Change::Modification { before, after, .. } = change {
        match (before, after) {
            (Some(b), Some(a)) if b.contains('\n') || a.contains('\n') => {
                let _ = writeln!(out, "   diff:");
                write_line_diff(out, b, a);
            }
            _ => {
                if let Some(b) = before {
                    let _ = writeln!(out, "   before: {b:?}");
                }
                if let Some(a) = after {
                    let _ = writeln!(out, "   after:  {a:?}");
                }
            }
        }
    }
}

fn write_line_diff(out: &mut String, before: &str, after: &str) {
    let diff = TextDiff::from_lines(before, after);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Equal => ' ',
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
        };
        let _ = writeln!(out, "     {sign} {}", change.value().trim_end_matches('\n'));
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}
