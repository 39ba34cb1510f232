//! Command-line interface definitions using the clap derive API.
//!
//! Global options (verbosity, error format) apply to every subcommand; each
//! detection mode is its own subcommand sharing a common argument set.
//!
//! # Example
//!
//! ```bash
//! # List byte-identical duplicates under a directory
//! dupescan exact ~/Downloads
//!
//! # Find visually similar images, tighter threshold, JSON output
//! dupescan image ~/Pictures --threshold 3 --output json
//!
//! # Move redundant copies of source files into quarantine
//! dupescan source ./src --action move --target ./quarantine
//!
//! # Verbose mode for debugging
//! dupescan -v exact ~/Downloads
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::actions::DuplicateAction;
use crate::duplicates::DEFAULT_THRESHOLD;

/// Duplicate file finder with exact, perceptual and source-aware modes.
///
/// dupescan detects byte-identical files via streaming BLAKE3 hashing,
/// visually similar images via 64-bit perceptual fingerprints, and
/// source files that differ only in whitespace or comments. Detected
/// groups can be listed, deleted, or moved aside.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available detection modes.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find byte-identical files
    Exact(ScanArgs),
    /// Find visually similar images
    Image(ImageArgs),
    /// Find source files equal up to whitespace and comments
    Source(ScanArgs),
}

/// Arguments shared by every detection mode.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan; also the boundary no action may escape
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Only consider files matching this glob pattern (repeatable)
    ///
    /// Patterns match the file name, case-insensitively. When omitted,
    /// the mode's default file set applies.
    #[arg(short, long = "pattern", value_name = "GLOB")]
    pub patterns: Vec<String>,

    /// Directory subtree to skip entirely (repeatable)
    #[arg(short = 'i', long = "ignore-dir", value_name = "PATH")]
    pub ignore_dirs: Vec<PathBuf>,

    /// What to do with each duplicate group
    #[arg(short, long, value_enum, default_value = "list")]
    pub action: DuplicateAction,

    /// Target directory for --action move (created if missing)
    #[arg(short, long, value_name = "PATH")]
    pub target: Option<PathBuf>,

    /// Send deleted files to the system trash instead of removing them
    #[arg(long)]
    pub trash: bool,

    /// Hash files on multiple threads
    ///
    /// Group ordering and survivor selection are unaffected.
    #[arg(long)]
    pub parallel: bool,

    /// Output format for the duplicate report
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the image subcommand.
#[derive(Debug, Args)]
pub struct ImageArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Maximum fingerprint bit distance for two images to match (0-64)
    ///
    /// 0 means identical fingerprints only; larger values cluster more
    /// loosely.
    #[arg(long, value_name = "BITS", default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: u32,
}

/// Output format for duplicate reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
