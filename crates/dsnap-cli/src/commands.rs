use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use dsnap_diff::{flatten, ChangeSummary};
use dsnap_dom::Document;
use dsnap_engine::{EngineConfig, SnapshotEngine};
use dsnap_types::{NodeHash, SerializedNode, SnapshotId};
use serde::Serialize;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut engine = build_engine(cli.config.as_deref())?;
    match cli.command {
        Command::Snapshot(args) => cmd_snapshot(&mut engine, args, cli.format),
        Command::Flatten(args) => cmd_flatten(&mut engine, args, cli.format),
        Command::Diff(args) => cmd_diff(&mut engine, args, cli.format),
    }
}

fn build_engine(config: Option<&Path>) -> anyhow::Result<SnapshotEngine> {
    let config = match config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    debug!(?config, "engine configuration");
    Ok(SnapshotEngine::with_config(config)?)
}

fn load_document(path: &Path) -> anyhow::Result<Document> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Document::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn capture(
    engine: &mut SnapshotEngine,
    path: &Path,
    label: Option<&str>,
) -> anyhow::Result<SnapshotId> {
    let document = load_document(path)?;
    let id = engine
        .create_snapshot(&document, &document.root(), label)
        .with_context(|| format!("capturing {}", path.display()))?;
    Ok(id)
}

fn cmd_snapshot(
    engine: &mut SnapshotEngine,
    args: SnapshotArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let id = capture(engine, &args.file, args.label.as_deref())?;
    let snapshot = engine
        .get_snapshot(id)
        .with_context(|| format!("{id} missing right after capture"))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&*snapshot)?),
        OutputFormat::Text => {
            println!(
                "{} {} ({}), {} element(s)",
                "Captured".green().bold(),
                snapshot.label.bold(),
                snapshot.id.to_string().yellow(),
                snapshot.element_count
            );
            for line in outline(&snapshot.structure) {
                println!("  {line}");
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FlatRow<'a> {
    path: &'a str,
    tag_name: &'a str,
    hash: NodeHash,
}

fn cmd_flatten(
    engine: &mut SnapshotEngine,
    args: FlattenArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let id = capture(engine, &args.file, None)?;
    let snapshot = engine
        .get_snapshot(id)
        .with_context(|| format!("{id} missing right after capture"))?;

    match format {
        OutputFormat::Json => {
            let rows: Vec<FlatRow<'_>> = flatten(&snapshot.structure)
                .into_values()
                .map(|node| FlatRow {
                    path: &node.path,
                    tag_name: &node.tag_name,
                    hash: node.hash,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            for line in flat_lines(&snapshot.structure) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn cmd_diff(
    engine: &mut SnapshotEngine,
    args: DiffArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let before = capture(engine, &args.before, args.label_before.as_deref())?;
    let after = capture(engine, &args.after, args.label_after.as_deref())?;
    let diff = engine.compare_snapshots(before, after)?;

    if format == OutputFormat::Text {
        println!("{}", summary_line(&diff.summary));
        println!();
    }
    print!("{}", engine.export_diff(&diff, format.report_name())?);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

/// One `path  tag  hash` line per node, in path order.
fn flat_lines(root: &SerializedNode) -> Vec<String> {
    flatten(root)
        .into_iter()
        .map(|(path, node)| {
            let path = if path.is_empty() { "/" } else { path };
            format!("{path:<16} {:<10} {}", node.tag_name, node.hash)
        })
        .collect()
}

fn outline(root: &SerializedNode) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        lines.push(format!(
            "{}{} {}",
            "  ".repeat(depth),
            node.describe(),
            node.hash.short_hex().dimmed()
        ));
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    lines
}

fn summary_line(summary: &ChangeSummary) -> String {
    if summary.total == 0 {
        return format!("{} No structural changes.", "✓".green().bold());
    }
    format!(
        "{} change(s): {} {} {} {}",
        summary.total.to_string().bold(),
        format!("+{}", summary.additions).green(),
        format!("-{}", summary.deletions).red(),
        format!("~{}", summary.modifications).yellow(),
        format!("→{}", summary.moves).cyan()
    )
}
