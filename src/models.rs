//! Core data models for blamelens
//!
//! These models are shared by the parser, the caches, and the CLI output
//! layer. Everything here is plain data: serializable, cloneable, and
//! immutable once produced.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque commit identifier as reported by the backend.
///
/// Equality is exact string match; this is the sole join key between
/// blame records and commit metadata.
pub type CommitId = String;

/// Metadata for one commit, recorded the first time its id appears in a
/// blame dump and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMeta {
    /// Author name
    pub author: String,
    /// Committer time in seconds since the epoch.
    /// `None` when the field was missing or non-numeric.
    pub timestamp: Option<i64>,
    /// Commit message (first line)
    pub summary: String,
}

impl Default for CommitMeta {
    fn default() -> Self {
        Self {
            author: "Unknown".to_string(),
            timestamp: None,
            summary: String::new(),
        }
    }
}

/// Attribution for a single line of the current file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAnnotation {
    /// Line number (1-indexed, in the current version of the file)
    pub line: u32,
    /// Commit that last touched this line
    pub commit: CommitId,
    /// Author name
    pub author: String,
    /// Commit date as `YYYY-MM-DD`, or `"unknown"` when the timestamp
    /// could not be parsed
    pub date: String,
    /// Commit message (first line)
    pub summary: String,
}

impl std::fmt::Display for LineAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} | {} | {}",
            self.commit, self.author, self.date, self.summary
        )
    }
}

/// Full attribution for one file: line number to annotation, one entry per
/// line the blame dump reports, iterated in line order.
pub type AttributionIndex = BTreeMap<u32, LineAnnotation>;

/// An elided rendering of one commit's diff to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CondensedDiff {
    /// The condensed, line-oriented rendering
    pub rendered: String,
    /// 1-based line within `rendered` matching the caller's line of
    /// interest, or the last line when nothing matched
    pub selected_position: usize,
}
