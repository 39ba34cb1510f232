//! Report rendering for duplicate scans.
//!
//! Two formats are supported: human-readable text on stdout and a JSON
//! document for scripting.
//!
//! # JSON Schema
//!
//! ```json
//! {
//!   "mode": "exact",
//!   "root": "/data",
//!   "groups": [
//!     {
//!       "key": "abc123...",
//!       "kind": "exact",
//!       "wasted_space": 1024,
//!       "files": ["/data/a.txt", "/data/b.txt"]
//!     }
//!   ],
//!   "failures": [
//!     { "path": "/data/locked.txt", "kind": "unreadable", "message": "..." }
//!   ],
//!   "summary": {
//!     "scanned": 100,
//!     "duplicate_groups": 1,
//!     "redundant_files": 1,
//!     "wasted_space": 1024
//!   },
//!   "action": { "processed": 1, "failures": [] }
//! }
//! ```

use std::io::Write;
use std::path::Path;

use bytesize::ByteSize;
use serde::Serialize;

use crate::actions::ActionOutcome;
use crate::duplicates::{DuplicateGroup, FindReport};
use crate::error::FileFailure;

/// A single duplicate group as serialized in JSON output.
#[derive(Debug, Serialize)]
struct JsonGroup {
    key: String,
    kind: String,
    wasted_space: u64,
    files: Vec<String>,
}

impl JsonGroup {
    fn from_group(group: &DuplicateGroup) -> Self {
        Self {
            key: group.key.to_string(),
            kind: group.kind.to_string(),
            wasted_space: group.wasted_space(),
            files: group
                .files
                .iter()
                .map(|f| f.path.display().to_string())
                .collect(),
        }
    }
}

/// Aggregate counters for a scan.
#[derive(Debug, Serialize)]
struct JsonSummary {
    scanned: usize,
    duplicate_groups: usize,
    redundant_files: usize,
    wasted_space: u64,
}

/// The complete JSON report document.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    mode: String,
    root: String,
    groups: Vec<JsonGroup>,
    failures: &'a [FileFailure],
    summary: JsonSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'a ActionOutcome>,
}

/// Write a report as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error when serialization or the write itself fails.
pub fn write_json<W: Write>(
    writer: &mut W,
    root: &Path,
    report: &FindReport,
    action: Option<&ActionOutcome>,
) -> anyhow::Result<()> {
    let document = JsonReport {
        mode: report.kind.to_string(),
        root: root.display().to_string(),
        groups: report.groups.iter().map(JsonGroup::from_group).collect(),
        failures: &report.failures,
        summary: JsonSummary {
            scanned: report.scanned,
            duplicate_groups: report.groups.len(),
            redundant_files: report.redundant_file_count(),
            wasted_space: report.wasted_space(),
        },
        action,
    };
    serde_json::to_writer_pretty(&mut *writer, &document)?;
    writeln!(writer)?;
    Ok(())
}

/// Write a human-readable report.
///
/// Groups appear in scan order; the first member of each group is marked
/// as the one that stays in place.
///
/// # Errors
///
/// Returns an error when the write fails.
pub fn write_text<W: Write>(
    writer: &mut W,
    root: &Path,
    report: &FindReport,
    action: Option<&ActionOutcome>,
) -> anyhow::Result<()> {
    writeln!(
        writer,
        "{} duplicates under {} ({} file(s) scanned)",
        report.kind,
        root.display(),
        report.scanned
    )?;

    if report.groups.is_empty() {
        writeln!(writer, "No duplicate groups found.")?;
    }

    for (index, group) in report.groups.iter().enumerate() {
        writeln!(writer)?;
        writeln!(
            writer,
            "Group {} [{}] ({} files, {} reclaimable)",
            index + 1,
            group.key,
            group.len(),
            ByteSize::b(group.wasted_space())
        )?;
        for (position, file) in group.files.iter().enumerate() {
            let marker = if position == 0 { "keep" } else { "dup " };
            writeln!(writer, "  {} {}", marker, file.path.display())?;
        }
    }

    if !report.failures.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Skipped {} file(s):", report.failures.len())?;
        for failure in &report.failures {
            writeln!(
                writer,
                "  {} ({}): {}",
                failure.path.display(),
                failure.kind,
                failure.message
            )?;
        }
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "Summary: {} group(s), {} redundant file(s), {} reclaimable",
        report.groups.len(),
        report.redundant_file_count(),
        ByteSize::b(report.wasted_space())
    )?;

    if let Some(outcome) = action {
        writeln!(writer, "Action: {}", outcome.summary())?;
        for failure in &outcome.failures {
            writeln!(writer, "  failed {}: {}", failure.path.display(), failure.message)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::{EquivalenceKey, EquivalenceKind};
    use crate::scanner::CandidateFile;
    use std::path::PathBuf;

    fn sample_report() -> FindReport {
        FindReport {
            kind: EquivalenceKind::Exact,
            groups: vec![DuplicateGroup {
                key: EquivalenceKey::Digest("abc123".into()),
                kind: EquivalenceKind::Exact,
                files: vec![
                    CandidateFile::new(PathBuf::from("/data/a.txt"), 10),
                    CandidateFile::new(PathBuf::from("/data/b.txt"), 10),
                ],
            }],
            scanned: 5,
            failures: vec![],
        }
    }

    #[test]
    fn test_text_marks_survivor_first() {
        let mut buf = Vec::new();
        write_text(&mut buf, Path::new("/data"), &sample_report(), None).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("keep /data/a.txt"));
        assert!(text.contains("dup  /data/b.txt"));
        assert!(text.contains("1 group(s), 1 redundant file(s)"));
    }

    #[test]
    fn test_text_empty_report() {
        let report = FindReport {
            kind: EquivalenceKind::Source,
            groups: vec![],
            scanned: 0,
            failures: vec![],
        };
        let mut buf = Vec::new();
        write_text(&mut buf, Path::new("/src"), &report, None).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("No duplicate groups found."));
    }

    #[test]
    fn test_json_schema_fields() {
        let mut buf = Vec::new();
        write_json(&mut buf, Path::new("/data"), &sample_report(), None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["mode"], "exact");
        assert_eq!(value["root"], "/data");
        assert_eq!(value["summary"]["scanned"], 5);
        assert_eq!(value["summary"]["duplicate_groups"], 1);
        // Redundant count excludes the survivor
        assert_eq!(value["summary"]["redundant_files"], 1);
        assert_eq!(value["summary"]["wasted_space"], 10);
        assert_eq!(value["groups"][0]["key"], "abc123");
        assert_eq!(value["groups"][0]["files"][0], "/data/a.txt");
        assert!(value.get("action").is_none());
    }

    #[test]
    fn test_json_includes_action_outcome() {
        let outcome = ActionOutcome {
            processed: 1,
            failures: vec![],
        };
        let mut buf = Vec::new();
        write_json(&mut buf, Path::new("/data"), &sample_report(), Some(&outcome)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["action"]["processed"], 1);
    }
}
