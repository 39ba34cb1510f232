//! Whitespace/comment normalization for source-equality hashing.
//!
//! # Overview
//!
//! [`SourceNormalizer`] reduces a source file to a canonical token stream:
//! block comments are removed first, then line comments, then all remaining
//! whitespace (indentation, intra-line runs, newlines) is dropped entirely.
//! Two files that differ only in formatting or comments therefore normalize
//! to identical bytes; `print('hello')` and `print( 'hello' )` are equal.
//!
//! The comment syntax is chosen per file extension; extensions without a
//! known syntax fall back to whitespace-only normalization. The normalized
//! stream is hashed with XXH3-128 (fast, not security-critical) and the hex
//! digest is the equivalence key for the source-duplicate path.
//!
//! Comment markers are matched textually: a marker inside a string literal
//! is treated as a comment start. This mirrors the simple line-based model
//! the tool has always used and keeps normalization language-agnostic.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur during normalization.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The file could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Unreadable {
        /// Path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid UTF-8 text.
    #[error("not a UTF-8 text file: {0}")]
    NotText(PathBuf),
}

/// Line and block comment markers for one language family.
#[derive(Debug, Clone, Copy)]
pub struct CommentSyntax {
    /// Markers that start a comment running to end of line.
    pub line: &'static [&'static str],
    /// Paired delimiters for block comments (non-nested).
    pub block: &'static [(&'static str, &'static str)],
}

const HASH_LINE: CommentSyntax = CommentSyntax {
    line: &["#"],
    block: &[],
};

const C_FAMILY: CommentSyntax = CommentSyntax {
    line: &["//"],
    block: &[("/*", "*/")],
};

const BLOCK_ONLY_C: CommentSyntax = CommentSyntax {
    line: &[],
    block: &[("/*", "*/")],
};

const MARKUP: CommentSyntax = CommentSyntax {
    line: &[],
    block: &[("<!--", "-->")],
};

const DASH_LINE: CommentSyntax = CommentSyntax {
    line: &["--"],
    block: &[],
};

/// Extensions recognized as source files, used as the default filter for
/// the source-duplicate path.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "bash", "c", "cc", "cpp", "cs", "css", "cxx", "go", "h", "hpp", "htm", "html", "java", "js",
    "jsx", "kt", "lua", "php", "pl", "py", "rb", "rs", "scala", "sh", "sql", "swift", "toml",
    "ts", "tsx", "xml", "yaml", "yml", "zsh",
];

/// Check whether an extension (without dot, lowercase) is a recognized
/// source extension.
#[must_use]
pub fn is_source_extension(extension: &str) -> bool {
    SOURCE_EXTENSIONS.contains(&extension)
}

/// Look up the comment syntax for an extension.
///
/// `None` means the extension gets whitespace-only normalization.
#[must_use]
pub fn syntax_for(extension: &str) -> Option<CommentSyntax> {
    match extension {
        "py" | "rb" | "sh" | "bash" | "zsh" | "pl" | "yml" | "yaml" | "toml" => Some(HASH_LINE),
        "rs" | "c" | "h" | "cpp" | "cc" | "cxx" | "hpp" | "js" | "jsx" | "ts" | "tsx" | "java"
        | "go" | "cs" | "kt" | "swift" | "scala" | "php" => Some(C_FAMILY),
        "css" => Some(BLOCK_ONLY_C),
        "html" | "htm" | "xml" => Some(MARKUP),
        "sql" | "lua" => Some(DASH_LINE),
        _ => None,
    }
}

/// Normalizes source text and hashes the normalized stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceNormalizer;

impl SourceNormalizer {
    /// Create a normalizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Normalize text according to the comment syntax for `extension`.
    ///
    /// Unrecognized extensions fall back to whitespace-only normalization.
    /// Whitespace is not significant at all in the output: the tokens of
    /// every line are concatenated with no separator.
    #[must_use]
    pub fn normalize(&self, text: &str, extension: &str) -> String {
        let syntax = syntax_for(extension);

        let without_blocks = match syntax {
            Some(s) if !s.block.is_empty() => strip_block_comments(text, s.block),
            _ => text.to_string(),
        };

        let line_markers = syntax.map_or(&[][..], |s| s.line);

        let mut normalized = String::with_capacity(without_blocks.len());
        for line in without_blocks.lines() {
            let code = strip_line_comment(line, line_markers);
            for word in code.split_whitespace() {
                normalized.push_str(word);
            }
        }
        normalized
    }

    /// Read, normalize and hash a file; returns the XXH3-128 hex digest.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::Unreadable`] when the file cannot be read
    /// and [`NormalizeError::NotText`] when it is not valid UTF-8.
    pub fn digest_file(&self, path: &Path) -> Result<String, NormalizeError> {
        let bytes = std::fs::read(path).map_err(|source| NormalizeError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes)
            .map_err(|_| NormalizeError::NotText(path.to_path_buf()))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let normalized = self.normalize(&text, &extension);
        Ok(format!(
            "{:032x}",
            twox_hash::xxh3::hash128(normalized.as_bytes())
        ))
    }
}

/// Remove non-nested block comments, replacing each with a single space so
/// the removal cannot splice a new comment marker together.
fn strip_block_comments(text: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    loop {
        // Earliest block start among all delimiter pairs
        let next = pairs
            .iter()
            .filter_map(|(open, close)| rest.find(open).map(|idx| (idx, *open, *close)))
            .min_by_key(|(idx, _, _)| *idx);

        match next {
            Some((idx, open, close)) => {
                out.push_str(&rest[..idx]);
                out.push(' ');
                let after_open = &rest[idx + open.len()..];
                match after_open.find(close) {
                    Some(end) => rest = &after_open[end + close.len()..],
                    // Unterminated block comment runs to end of input
                    None => return out,
                }
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Truncate a line at the earliest line-comment marker.
fn strip_line_comment<'a>(line: &'a str, markers: &[&str]) -> &'a str {
    let cut = markers
        .iter()
        .filter_map(|marker| line.find(marker))
        .min();
    match cut {
        Some(idx) => &line[..idx],
        None => line,
    }
}
