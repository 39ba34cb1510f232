//! dupescan - duplicate detection and group actions.
//!
//! A CLI engine for finding duplicate files three ways: exact byte equality
//! (streaming BLAKE3), perceptual image similarity (64-bit fingerprints with
//! Hamming-threshold clustering), and source equality up to whitespace and
//! comments. Detected groups can be listed, deleted, or moved aside, always
//! keeping the first file in scan order.

pub mod actions;
pub mod boundary;
pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;

use std::io::Write;
use std::path::Path;

use anyhow::Context;

use actions::{ActionOutcome, DuplicateAction, ExecutorOptions, GroupActionExecutor};
use cli::{Cli, Commands, OutputFormat, ScanArgs};
use duplicates::{DuplicateFinder, FindReport, FinderConfig};
use error::ExitCode;

/// Run the application with parsed CLI arguments.
///
/// Returns the exit code for normal completions; fatal errors (bad
/// configuration, boundary violations) come back as `Err` and map to
/// [`ExitCode::GeneralError`] in `main`.
///
/// # Errors
///
/// Returns an error for invalid configuration, boundary violations, an
/// uncreatable move target, or report rendering failures.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Exact(args) => run_scan(&args, duplicates::DEFAULT_THRESHOLD, Mode::Exact),
        Commands::Image(args) => run_scan(&args.scan, args.threshold, Mode::Image),
        Commands::Source(args) => run_scan(&args, duplicates::DEFAULT_THRESHOLD, Mode::Source),
    }
}

enum Mode {
    Exact,
    Image,
    Source,
}

fn run_scan(args: &ScanArgs, threshold: u32, mode: Mode) -> anyhow::Result<ExitCode> {
    let config = FinderConfig {
        patterns: args.patterns.clone(),
        ignore_dirs: args.ignore_dirs.clone(),
        threshold,
        parallel: args.parallel,
    };
    let finder = DuplicateFinder::new(&args.path, config)
        .with_context(|| format!("cannot scan {}", args.path.display()))?;

    let report = match mode {
        Mode::Exact => finder.find_exact(),
        Mode::Image => finder.find_perceptual(),
        Mode::Source => finder.find_source(),
    };

    let outcome = apply_action(&finder, &report, args)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match args.output {
        OutputFormat::Text => {
            output::write_text(&mut handle, finder.root(), &report, outcome.as_ref())?;
        }
        OutputFormat::Json => {
            output::write_json(&mut handle, finder.root(), &report, outcome.as_ref())?;
        }
    }
    handle.flush()?;

    Ok(resolve_exit_code(&report, outcome.as_ref()))
}

/// Apply the requested action; `None` for a plain listing.
fn apply_action(
    finder: &DuplicateFinder,
    report: &FindReport,
    args: &ScanArgs,
) -> anyhow::Result<Option<ActionOutcome>> {
    if args.action == DuplicateAction::List {
        return Ok(None);
    }

    let executor = GroupActionExecutor::new(ExecutorOptions {
        use_trash: args.trash,
    })
    .with_boundary(finder.boundary());

    let outcome = executor
        .apply(&report.groups, args.action, args.target.as_deref())
        .with_context(|| format!("{} action failed", args.action))?;
    Ok(Some(outcome))
}

/// Map a completed run to its exit code.
///
/// Per-file scan or action failures win over the no-duplicates code; a run
/// that skipped files never reports a clean empty result.
fn resolve_exit_code(report: &FindReport, outcome: Option<&ActionOutcome>) -> ExitCode {
    let action_failed = outcome.is_some_and(|o| !o.all_succeeded());
    if report.has_failures() || action_failed {
        ExitCode::PartialSuccess
    } else if report.groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    }
}

/// Convenience wrapper used by integration tests and library consumers.
///
/// Scans `root` for exact duplicates with default configuration.
///
/// # Errors
///
/// Returns [`error::ConfigError`] for a missing or non-directory root.
pub fn find_exact_duplicates(root: &Path) -> Result<FindReport, error::ConfigError> {
    let finder = DuplicateFinder::new(root, FinderConfig::default())?;
    Ok(finder.find_exact())
}
