//! Commit diff fetching and condensation
//!
//! A commit's diff to one file is immutable history, so fetched diffs are
//! cached forever, including negative results. Condensation reduces a raw
//! diff to its added and removed lines, collapsing unchanged context into
//! placeholder lines so the rendering stays scannable, and tracks where a
//! caller-supplied line of interest landed.

use crate::git::backend::{BackendResult, GitBackend};
use crate::models::CondensedDiff;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Placeholder emitted for a run of unchanged context lines.
const PLACEHOLDER: &str = "...";

/// Per-(commit, file) diff cache over the backend.
///
/// `None` values record "no diff available" (commit unknown, file absent at
/// that revision); they are cached like any other result.
#[derive(Default)]
pub struct DiffFetcher {
    cache: DashMap<(String, PathBuf), Option<Arc<String>>>,
}

impl DiffFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the diff `commit` introduced to `file`, memoized.
    pub fn fetch(
        &self,
        backend: &GitBackend,
        commit: &str,
        file: &Path,
    ) -> BackendResult<Option<Arc<String>>> {
        let key = (commit.to_string(), file.to_path_buf());
        if let Some(hit) = self.cache.get(&key) {
            debug!("Diff cache hit for {} {:?}", commit, file);
            return Ok(hit.clone());
        }

        let fetched = backend.commit_diff(commit, file)?.map(Arc::new);
        self.cache.insert(key, fetched.clone());
        Ok(fetched)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Diff-format metadata, not content: `diff`/`index` header lines and the
/// `+++`/`---`/`@@` file and hunk markers.
fn is_header(line: &str) -> bool {
    line.starts_with("diff")
        || line.starts_with("index")
        || line.starts_with("++")
        || line.starts_with("--")
        || line.starts_with("@@")
}

/// Split a changed line into its sign and marker-stripped text.
///
/// Handles regular `+`/`-` markers and the unified old-marker variant of a
/// space followed by `-`.
fn changed_line(line: &str) -> Option<(char, &str)> {
    if let Some(rest) = line.strip_prefix('+') {
        Some(('+', rest))
    } else if let Some(rest) = line.strip_prefix('-') {
        Some(('-', rest))
    } else if let Some(rest) = line.strip_prefix(" -") {
        Some(('-', rest))
    } else {
        None
    }
}

/// Condense a raw diff into an elided rendering.
///
/// Added and removed lines survive re-tagged `+ ` / `- `; each maximal run
/// of context lines collapses to a single `...`; the rendering always ends
/// with a `...`. `selected_position` is the 1-based position of the first
/// changed line whose text equals `line_of_interest`, or the total line
/// count when nothing matches, so a cursor always lands inside the
/// rendering. An empty diff renders as a lone placeholder at position 1.
pub fn condense(raw: &str, line_of_interest: Option<&str>) -> CondensedDiff {
    let mut out: Vec<String> = Vec::new();
    let mut matched: Option<usize> = None;

    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        if is_header(line) {
            continue;
        }
        match changed_line(line) {
            Some((sign, text)) => {
                out.push(format!("{sign} {text}"));
                if matched.is_none() && line_of_interest == Some(text) {
                    matched = Some(out.len());
                }
            }
            None => {
                // Collapse runs of context; never two placeholders in a row.
                if out.last().map(String::as_str) != Some(PLACEHOLDER) {
                    out.push(PLACEHOLDER.to_string());
                }
            }
        }
    }

    // Close the rendering with a trailing placeholder.
    if out.last().map(String::as_str) != Some(PLACEHOLDER) {
        out.push(PLACEHOLDER.to_string());
    }

    let selected_position = matched.unwrap_or(out.len());
    CondensedDiff {
        rendered: out.join("\n"),
        selected_position,
    }
}
