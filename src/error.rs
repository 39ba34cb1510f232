//! Error taxonomy, structured errors and exit codes.
//!
//! Two tiers of failure exist in the engine:
//!
//! - **Fatal**: configuration problems ([`ConfigError`]) and boundary
//!   violations ([`crate::boundary::BoundaryError`]) abort the whole
//!   operation before or during setup, never leaving a partial result.
//! - **Recoverable**: per-file problems ([`FileFailure`]) are logged,
//!   collected and surfaced alongside a complete result; the scan or
//!   action continues.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Fatal configuration errors, surfaced before any scanning begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The scan root does not exist.
    #[error("root does not exist: {0}")]
    RootNotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("root is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    /// An extension glob pattern failed to compile.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it failed to compile.
        message: String,
    },

    /// A Hamming threshold larger than the fingerprint width.
    #[error("invalid similarity threshold {threshold}: must be <= {max}")]
    InvalidThreshold {
        /// The rejected threshold.
        threshold: u32,
        /// The fingerprint width in bits.
        max: u32,
    },

    /// The move action was requested without a target directory.
    #[error("move action requires a target directory")]
    MissingMoveTarget,
}

/// Why a candidate file was excluded from results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The file could not be opened or streamed.
    Unreadable,
    /// The file could not be decoded as an image or normalized as text.
    Unsupported,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable => write!(f, "unreadable"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// A recoverable per-file failure, collected into scan reports.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    /// Path of the file that failed.
    pub path: PathBuf,
    /// Failure classification.
    pub kind: FailureKind,
    /// Human-readable cause.
    pub message: String,
}

impl FileFailure {
    /// Record an unreadable file.
    #[must_use]
    pub fn unreadable(path: PathBuf, message: impl ToString) -> Self {
        Self {
            path,
            kind: FailureKind::Unreadable,
            message: message.to_string(),
        }
    }

    /// Record an undecodable or unnormalizable file.
    #[must_use]
    pub fn unsupported(path: PathBuf, message: impl ToString) -> Self {
        Self {
            path,
            kind: FailureKind::Unsupported,
            message: message.to_string(),
        }
    }
}

/// Exit codes for the dupescan application.
///
/// - 0: completed normally, duplicates found
/// - 1: general error (unexpected failure)
/// - 2: completed normally, no duplicates found
/// - 3: completed with some non-fatal per-file errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and duplicates were found.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Scan completed but encountered some non-fatal errors.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g. "DS001").
    pub code: String,
    /// The exit code number.
    pub exit_code: i32,
    /// Human-readable error message.
    pub message: String,
}

impl StructuredError {
    /// Create a structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::NoDuplicates.as_i32(), 2);
        assert_eq!(ExitCode::PartialSuccess.as_i32(), 3);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::RootNotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "root does not exist: /missing");

        let err = ConfigError::InvalidThreshold {
            threshold: 99,
            max: 64,
        };
        assert_eq!(
            err.to_string(),
            "invalid similarity threshold 99: must be <= 64"
        );
    }

    #[test]
    fn test_file_failure_constructors() {
        let f = FileFailure::unreadable(PathBuf::from("/a"), "denied");
        assert_eq!(f.kind, FailureKind::Unreadable);
        let f = FileFailure::unsupported(PathBuf::from("/b"), "bad magic");
        assert_eq!(f.kind, FailureKind::Unsupported);
    }

    #[test]
    fn test_structured_error_serializes() {
        let err = anyhow::anyhow!("boom");
        let s = StructuredError::new(&err, ExitCode::GeneralError);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("DS001"));
        assert!(json.contains("boom"));
    }
}
