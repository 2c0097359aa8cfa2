//! CLI Argument Structures
//!
//! This module contains all CLI argument definitions and command structures
//! used by the plagiscan binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use plagiscan::core::config::DATA_DIR_ENV;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Near-duplicate detection for code submissions
#[derive(Parser)]
#[command(name = "plagiscan")]
#[command(version = VERSION)]
#[command(about = "Plagiscan - near-duplicate detection for code submissions")]
#[command(long_about = "
Fingerprint code submissions and compare each one against earlier submissions
of the same assignment. A submission is flagged when its combined lexical and
structural similarity to its best match exceeds the configured threshold.

Common Usage:

  # Upload and analyze one file
  plagiscan submit solution.py --student alice --assignment hw1

  # Analyze a directory laid out as <dir>/<student>/...
  plagiscan batch ./submissions --assignment hw1

  # Inspect results
  plagiscan list --assignment hw1
  plagiscan report work_3 --format json
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to .plagiscan.yml in the working directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding uploaded files and the submission ledger
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a file without analyzing it
    Upload(UploadArgs),

    /// Analyze a previously uploaded file
    Analyze(AnalyzeArgs),

    /// Upload a file and analyze it
    Submit(SubmitArgs),

    /// Submit every file under <dir>/<student>/ for one assignment
    Batch(BatchArgs),

    /// Show the report of a submission
    Report(ReportArgs),

    /// List submissions of an assignment, or all assignments
    List(ListArgs),

    /// Check the content store and the ledger
    Health,

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Initialize a configuration file with defaults
    #[command(name = "init-config")]
    InitConfig(InitConfigArgs),

    /// Validate the configuration file given with --config
    #[command(name = "validate-config")]
    ValidateConfig,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored tables for terminals
    Pretty,
    /// JSON on stdout
    Json,
}

#[derive(Args)]
pub struct UploadArgs {
    /// File to upload
    pub path: PathBuf,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Identifier returned by `upload`
    #[arg(long)]
    pub file_id: String,

    /// Student the file belongs to
    #[arg(long)]
    pub student: String,

    /// Assignment to compare against
    #[arg(long)]
    pub assignment: String,
}

#[derive(Args)]
pub struct SubmitArgs {
    /// File to submit
    pub path: PathBuf,

    /// Student the file belongs to
    #[arg(long)]
    pub student: String,

    /// Assignment to compare against
    #[arg(long)]
    pub assignment: String,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Directory with one sub-directory per student
    pub dir: PathBuf,

    /// Assignment every file is submitted to
    #[arg(long)]
    pub assignment: String,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Work id of the submission
    pub work_id: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Assignment to list; omit to summarize all assignments
    #[arg(long)]
    pub assignment: Option<String>,
}

#[derive(Args)]
pub struct InitConfigArgs {
    /// Output configuration file name
    #[arg(short, long, default_value = ".plagiscan.yml")]
    pub output: PathBuf,

    /// Overwrite existing configuration file
    #[arg(short, long)]
    pub force: bool,
}
