//! Blame porcelain parsing
//!
//! Turns the raw text of `git blame -p` into an [`AttributionIndex`]. The
//! porcelain format interleaves header records (`<sha> <orig> <final>
//! [<count>]`) with metadata lines (`author`, `committer-time`, `summary`)
//! and tab-prefixed content lines. Metadata appears only after the first
//! header for a given commit; later records for the same commit rely on the
//! earlier block, so parsing is a single stateful pass.

use crate::models::{AttributionIndex, CommitMeta, LineAnnotation};
use chrono::{TimeZone, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Header record: commit id, line in the original file, line in the current
/// file, and an optional group length. The current-file line (3rd field) is
/// authoritative. Two integer fields are required so single-integer metadata
/// lines such as `author-time` never read as headers.
fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"^(\S+) (\d+) (\d+)(?: (\d+))?$").expect("valid regex"))
}

/// Per-parse table of commit metadata.
///
/// Each commit id is written at most once; later records for the same id
/// reuse the stored entry. One table is scoped to one parse invocation so
/// ids from different files or repositories never collide.
#[derive(Debug, Default)]
pub struct CommitMetaTable {
    entries: HashMap<String, CommitMeta>,
}

impl CommitMetaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&CommitMeta> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Return the stored metadata for `id`, computing and storing it via
    /// `build` only when the id has never been seen.
    pub fn get_or_insert(&mut self, id: &str, build: impl FnOnce() -> CommitMeta) -> &CommitMeta {
        self.entries.entry(id.to_string()).or_insert_with(build)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mutable scan state threaded through the pass over dump lines.
#[derive(Debug, Default)]
struct ScanState {
    /// Commit id of the record currently in effect
    commit: Option<String>,
    /// Resulting line number the next annotation lands on
    line: u32,
    /// Metadata still being collected for a first-seen commit
    draft: CommitMeta,
    /// Commit id the draft belongs to, while its block is open
    collecting: Option<String>,
}

impl ScanState {
    /// Close the open metadata block, storing the draft first-wins.
    fn finalize_draft(&mut self, table: &mut CommitMetaTable) {
        if let Some(id) = self.collecting.take() {
            let draft = std::mem::take(&mut self.draft);
            table.get_or_insert(&id, || draft);
        }
    }
}

/// Parse a porcelain blame dump into a per-line attribution index.
///
/// Every dump line re-asserts the annotation at the current resulting line,
/// so content lines inherit the attribution of the header that preceded
/// them, and metadata lines arriving after the header upgrade the record
/// before the content line closes it out. Malformed or missing metadata
/// degrades to placeholders; the parser itself never fails on text.
pub fn parse_porcelain(dump: &str) -> AttributionIndex {
    let mut table = CommitMetaTable::new();
    let mut index = AttributionIndex::new();
    let mut state = ScanState::default();

    for raw in dump.lines() {
        if let Some(caps) = header_regex().captures(raw) {
            let id = caps[1].to_string();
            let line = caps[3].parse().unwrap_or(0);

            if state.collecting.as_deref() != Some(id.as_str()) {
                state.finalize_draft(&mut table);
                if !table.contains(&id) {
                    state.collecting = Some(id.clone());
                }
            }
            state.commit = Some(id);
            state.line = line;
        } else if let Some(rest) = raw.strip_prefix("author ") {
            if state.collecting.is_some() {
                state.draft.author = rest.trim().to_string();
            }
        } else if let Some(rest) = raw.strip_prefix("committer-time ") {
            if state.collecting.is_some() {
                // Non-numeric timestamps degrade to the unknown-date sentinel.
                state.draft.timestamp = rest.trim().parse().ok();
            }
        } else if let Some(rest) = raw.strip_prefix("summary ") {
            if state.collecting.is_some() {
                state.draft.summary = rest.trim().to_string();
            }
        }

        // Re-assert the annotation at the current line on every dump line.
        if let Some(commit) = &state.commit {
            if state.line > 0 {
                let meta = table
                    .get(commit)
                    .cloned()
                    .unwrap_or_else(|| state.draft.clone());
                index.insert(
                    state.line,
                    LineAnnotation {
                        line: state.line,
                        commit: commit.clone(),
                        author: meta.author,
                        date: format_commit_date(meta.timestamp),
                        summary: meta.summary,
                    },
                );
            }
        }
    }

    state.finalize_draft(&mut table);
    index
}

/// Format a commit timestamp as `YYYY-MM-DD`, or `"unknown"` when the
/// timestamp was missing, non-numeric, or out of range.
pub fn format_commit_date(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_DUMP: &str = "\
abc123 5 5 1
author Jane
committer-time 1700000000
summary Fix bug
filename f
\tx = 1
";

    #[test]
    fn parses_single_record() {
        let index = parse_porcelain(SIMPLE_DUMP);
        assert_eq!(index.len(), 1);
        let ann = &index[&5];
        assert_eq!(ann.commit, "abc123");
        assert_eq!(ann.author, "Jane");
        assert_eq!(ann.date, "2023-11-14");
        assert_eq!(ann.summary, "Fix bug");
    }

    #[test]
    fn reparse_is_idempotent() {
        assert_eq!(parse_porcelain(SIMPLE_DUMP), parse_porcelain(SIMPLE_DUMP));
    }

    #[test]
    fn third_field_is_authoritative_for_resulting_line() {
        let dump = "abc123 3 7 1\nauthor Jane\nsummary s\n\tcontent\n";
        let index = parse_porcelain(dump);
        assert!(index.contains_key(&7));
        assert!(!index.contains_key(&3));
    }

    #[test]
    fn repeat_headers_reuse_first_metadata_block() {
        let dump = "\
abc123 1 1 1
author Jane
committer-time 1700000000
summary First
\tone
def456 2 2 1
author Bob
committer-time 1700000001
summary Other
\ttwo
abc123 3 3 1
\tthree
";
        let index = parse_porcelain(dump);
        assert_eq!(index.len(), 3);
        assert_eq!(index[&1].author, "Jane");
        assert_eq!(index[&2].author, "Bob");
        // No metadata follows the repeat header; the table supplies it.
        assert_eq!(index[&3].author, "Jane");
        assert_eq!(index[&3].summary, "First");
    }

    #[test]
    fn multi_line_group_attributes_every_line() {
        let dump = "\
abc123 1 4 2
author Jane
committer-time 1700000000
summary Fix bug
\tfirst
abc123 2 5
\tsecond
";
        let index = parse_porcelain(dump);
        assert_eq!(index[&4].author, "Jane");
        assert_eq!(index[&5].author, "Jane");
        assert_eq!(index[&5].commit, "abc123");
    }

    #[test]
    fn malformed_timestamp_degrades_to_unknown_date() {
        let dump = "abc123 1 1 1\nauthor Jane\ncommitter-time soon\nsummary s\n\tx\n";
        let index = parse_porcelain(dump);
        assert_eq!(index[&1].date, "unknown");
        assert_eq!(index[&1].author, "Jane");
    }

    #[test]
    fn missing_metadata_degrades_to_placeholders() {
        let dump = "abc123 1 1 1\n\tx\n";
        let index = parse_porcelain(dump);
        assert_eq!(index[&1].author, "Unknown");
        assert_eq!(index[&1].summary, "");
        assert_eq!(index[&1].date, "unknown");
    }

    #[test]
    fn lines_before_any_header_produce_no_records() {
        let dump = "author Jane\nsummary orphan\n";
        assert!(parse_porcelain(dump).is_empty());
    }

    #[test]
    fn metadata_lines_are_not_mistaken_for_headers() {
        // `committer-time 1700000000` has a single integer field and must
        // not move the current resulting line.
        let dump = "\
abc123 1 1 1
author Jane
committer-time 1700000000
summary s
\tx
";
        let index = parse_porcelain(dump);
        assert_eq!(index.len(), 1);
        assert!(index.contains_key(&1));
    }

    #[test]
    fn table_builder_runs_once_per_id() {
        let mut table = CommitMetaTable::new();
        let mut calls = 0;
        let first = table
            .get_or_insert("abc", || {
                calls += 1;
                CommitMeta {
                    author: "Jane".to_string(),
                    timestamp: Some(1_700_000_000),
                    summary: "s".to_string(),
                }
            })
            .clone();
        let second = table
            .get_or_insert("abc", || {
                calls += 1;
                CommitMeta::default()
            })
            .clone();
        assert_eq!(calls, 1);
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn date_formatting() {
        assert_eq!(format_commit_date(Some(1_700_000_000)), "2023-11-14");
        assert_eq!(format_commit_date(None), "unknown");
    }
}
