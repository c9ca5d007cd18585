use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dsnap",
    about = "dsnap: structural DOM snapshots and diffs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Name understood by the report renderer.
    pub fn report_name(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Capture a markup document and print its hashed tree
    Snapshot(SnapshotArgs),
    /// Print every node of a markup document with its path and hash
    Flatten(FlattenArgs),
    /// Capture two markup documents and report the changes between them
    Diff(DiffArgs),
}

#[derive(Args)]
pub struct SnapshotArgs {
    pub file: PathBuf,
    #[arg(short, long)]
    pub label: Option<String>,
}

#[derive(Args)]
pub struct FlattenArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DiffArgs {
    pub before: PathBuf,
    pub after: PathBuf,
    #[arg(long)]
    pub label_before: Option<String>,
    #[arg(long)]
    pub label_after: Option<String>,
}
