use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "check-view",
    about = "Browse a static analyzer's results database from the terminal"
)]
pub struct Cli {
    /// Results database produced by the analyzer. Shorthand for `view <db>`.
    pub db: Option<PathBuf>,

    /// Print a per-file summary instead of launching the TUI.
    #[arg(short, long)]
    pub status: bool,

    /// Initial check kind filter as a hex mask (as printed in the status bar).
    #[arg(short, long)]
    pub kinds: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive file list (default).
    View(ViewArgs),
    /// Print a per-file summary of check counts.
    Status(StatusArgs),
    /// Open the annotated report for a single file.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Results database produced by the analyzer.
    pub db: PathBuf,

    /// Initial check kind filter as a hex mask.
    #[arg(short, long)]
    pub kinds: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Results database produced by the analyzer.
    pub db: PathBuf,

    /// Check kind filter as a hex mask applied to the printed counts.
    #[arg(short, long)]
    pub kinds: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Results database produced by the analyzer.
    pub db: PathBuf,

    /// File id as listed by `status`.
    pub file_id: i64,

    /// Initial check kind filter as a hex mask.
    #[arg(short, long)]
    pub kinds: Option<String>,
}

/// Parse CLI arguments.
pub fn parse_args() -> Cli {
    Cli::parse()
}
