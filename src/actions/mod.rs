//! Group actions: list, delete and move over duplicate groups.
//!
//! The survivor policy is fixed: the first member of each group in scan
//! order stays in place; every other member is the subject of the action.

pub mod executor;

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;

pub use executor::{ExecutorError, ExecutorOptions, GroupActionExecutor};

/// Action applied independently to each duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateAction {
    /// Report groups without mutating anything (dry run).
    List,
    /// Delete every non-survivor.
    Delete,
    /// Move every non-survivor into a target directory.
    Move,
}

impl std::fmt::Display for DuplicateAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Delete => write!(f, "delete"),
            Self::Move => write!(f, "move"),
        }
    }
}

/// A recoverable per-file action failure.
#[derive(Debug, Clone, Serialize)]
pub struct ActionFailure {
    /// The file that could not be deleted or moved.
    pub path: PathBuf,
    /// Human-readable cause.
    pub message: String,
}

/// Result of applying an action to a set of groups.
///
/// `processed` counts non-survivor files successfully handled; failures are
/// additive and never silently dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActionOutcome {
    /// Non-survivor files successfully deleted or moved.
    pub processed: usize,
    /// Per-file failures, in processing order.
    pub failures: Vec<ActionFailure>,
}

impl ActionOutcome {
    /// Whether every attempted operation succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the outcome.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!("processed {} file(s)", self.processed)
        } else {
            format!(
                "processed {} file(s), {} failed",
                self.processed,
                self.failures.len()
            )
        }
    }
}
