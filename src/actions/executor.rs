//! Executes list/delete/move actions over duplicate groups.
//!
//! # Overview
//!
//! [`GroupActionExecutor`] consumes the groups a find operation produced
//! and applies one [`DuplicateAction`](super::DuplicateAction) to each,
//! independently. Within a group the first member (scan order) is the
//! survivor and is never touched.
//!
//! # Safety
//!
//! - When a [`BoundaryGuard`] is attached, every member path and the move
//!   target are validated *before* any mutation; a violation aborts the
//!   whole call with nothing changed.
//! - A failed delete or move is recorded in the outcome and does not block
//!   the rest of the group or other groups.
//! - Move never overwrites: name collisions in the target directory get a
//!   deterministic `stem_N.ext` rename.
//! - Mutation is sequential per group, keeping outcomes deterministic even
//!   when the preceding scan hashed in parallel.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::boundary::{BoundaryError, BoundaryGuard};
use crate::duplicates::DuplicateGroup;
use crate::error::ConfigError;

use super::{ActionFailure, ActionOutcome, DuplicateAction};

/// Fatal executor errors; per-file problems go into the outcome instead.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Invalid invocation (e.g. move without a target).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A member path or the move target escapes the declared boundary.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    /// The move target directory could not be created.
    #[error("cannot create target directory {path}: {source}")]
    TargetCreate {
        /// The target directory.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Options controlling how the executor mutates files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorOptions {
    /// Send deleted files to the system trash instead of removing them
    /// permanently.
    pub use_trash: bool,
}

/// Applies group actions under the survivor policy.
#[derive(Debug, Default)]
pub struct GroupActionExecutor<'a> {
    boundary: Option<&'a BoundaryGuard>,
    options: ExecutorOptions,
}

impl<'a> GroupActionExecutor<'a> {
    /// Create an executor.
    #[must_use]
    pub fn new(options: ExecutorOptions) -> Self {
        Self {
            boundary: None,
            options,
        }
    }

    /// Attach a boundary guard; all touched paths must stay inside it.
    #[must_use]
    pub fn with_boundary(mut self, guard: &'a BoundaryGuard) -> Self {
        self.boundary = Some(guard);
        self
    }

    /// Apply `action` to every group.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Config`] for a move without target and
    /// [`ExecutorError::Boundary`] when a member path or the target escapes
    /// the attached boundary. Both are raised before any mutation.
    pub fn apply(
        &self,
        groups: &[DuplicateGroup],
        action: DuplicateAction,
        target: Option<&Path>,
    ) -> Result<ActionOutcome, ExecutorError> {
        match action {
            DuplicateAction::List => {
                log::info!("list action: {} group(s), no mutation", groups.len());
                Ok(ActionOutcome::default())
            }
            DuplicateAction::Delete => {
                self.preflight(groups)?;
                Ok(self.delete_groups(groups))
            }
            DuplicateAction::Move => {
                let target = target.ok_or(ConfigError::MissingMoveTarget)?;
                let target = match self.boundary {
                    Some(guard) => guard.resolve(target)?,
                    None => target.to_path_buf(),
                };
                self.preflight(groups)?;
                fs::create_dir_all(&target).map_err(|source| ExecutorError::TargetCreate {
                    path: target.clone(),
                    source,
                })?;
                Ok(self.move_groups(groups, &target))
            }
        }
    }

    /// Validate every member path against the boundary before mutating.
    fn preflight(&self, groups: &[DuplicateGroup]) -> Result<(), ExecutorError> {
        if let Some(guard) = self.boundary {
            for group in groups {
                for file in &group.files {
                    guard.resolve(&file.path)?;
                }
            }
        }
        Ok(())
    }

    fn delete_groups(&self, groups: &[DuplicateGroup]) -> ActionOutcome {
        let mut outcome = ActionOutcome::default();
        for group in groups {
            log::debug!(
                "delete: keeping {} of group {}",
                group.survivor().path.display(),
                group.key
            );
            for file in group.redundant() {
                match self.delete_one(&file.path) {
                    Ok(()) => {
                        log::info!("deleted {}", file.path.display());
                        outcome.processed += 1;
                    }
                    Err(message) => {
                        log::error!("failed to delete {}: {}", file.path.display(), message);
                        outcome.failures.push(ActionFailure {
                            path: file.path.clone(),
                            message,
                        });
                    }
                }
            }
        }
        outcome
    }

    fn delete_one(&self, path: &Path) -> Result<(), String> {
        if self.options.use_trash {
            trash::delete(path).map_err(|e| e.to_string())
        } else {
            fs::remove_file(path).map_err(|e| e.to_string())
        }
    }

    fn move_groups(&self, groups: &[DuplicateGroup], target: &Path) -> ActionOutcome {
        let mut outcome = ActionOutcome::default();
        for group in groups {
            log::debug!(
                "move: keeping {} of group {}",
                group.survivor().path.display(),
                group.key
            );
            for file in group.redundant() {
                let destination = unique_destination(target, &file.file_name());
                match move_file(&file.path, &destination) {
                    Ok(()) => {
                        log::info!(
                            "moved {} -> {}",
                            file.path.display(),
                            destination.display()
                        );
                        outcome.processed += 1;
                    }
                    Err(e) => {
                        log::error!("failed to move {}: {}", file.path.display(), e);
                        outcome.failures.push(ActionFailure {
                            path: file.path.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
        outcome
    }
}

/// Pick a destination in `dir` that does not collide with an existing file.
///
/// The original name is preferred; collisions get `stem_N.ext` with the
/// smallest N (starting at 1) producing a fresh name.
fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let original = Path::new(file_name);
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let extension = original.extension().map(|e| e.to_string_lossy().into_owned());

    let mut counter = 1u32;
    loop {
        let renamed = match &extension {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        let candidate = dir.join(renamed);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Move a file, falling back to copy + remove when rename fails (e.g.
/// across file systems).
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if !source.exists() {
                return Err(rename_err);
            }
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
    }
}
