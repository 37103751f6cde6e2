//! Attribution queries
//!
//! [`Annotator`] is the session object tying the backend to the caches: one
//! instance per repository, holding the attribution cache (keyed by head
//! reference) and the diff cache (immutable history, never invalidated).
//! Queries are idempotent and safe to issue from multiple threads; a lookup
//! superseded mid-flight simply populates a key a newer head no longer
//! reads.

use crate::cache::AttributionCache;
use crate::git::backend::{BackendResult, GitBackend};
use crate::git::blame;
use crate::git::diff::{self, DiffFetcher};
use crate::models::{AttributionIndex, CondensedDiff, LineAnnotation};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Line-attribution session for one repository.
pub struct Annotator {
    backend: GitBackend,
    attributions: AttributionCache,
    diffs: DiffFetcher,
}

impl Annotator {
    /// Open a session for the repository containing `path`.
    pub fn open(path: &Path) -> BackendResult<Self> {
        Ok(Self {
            backend: GitBackend::discover(path)?,
            attributions: AttributionCache::new(),
            diffs: DiffFetcher::new(),
        })
    }

    pub fn backend(&self) -> &GitBackend {
        &self.backend
    }

    /// The full attribution index for one file at the current head,
    /// parsed on first use and cached until the head moves.
    pub fn annotations_for(&self, file: &Path) -> BackendResult<Arc<AttributionIndex>> {
        let head = self.backend.head_ref()?;
        if let Some(hit) = self.attributions.get(file, &head) {
            debug!("Attribution cache hit for {:?} at {}", file, head);
            return Ok(hit);
        }

        let dump = self.backend.blame_porcelain(file)?;
        let index = blame::parse_porcelain(&dump);
        debug!("Attributed {} lines in {:?}", index.len(), file);
        Ok(self.attributions.put(file, &head, index))
    }

    /// The commit that last touched `line` of `file`, or `None` when the
    /// line is out of range.
    pub fn annotation_for(&self, file: &Path, line: u32) -> BackendResult<Option<LineAnnotation>> {
        Ok(self.annotations_for(file)?.get(&line).cloned())
    }

    /// The condensed diff of the commit behind `annotation`, restricted to
    /// `file`. A diff the backend cannot produce condenses to the empty
    /// rendering rather than failing.
    pub fn diff_for(
        &self,
        annotation: &LineAnnotation,
        file: &Path,
        line_of_interest: Option<&str>,
    ) -> BackendResult<CondensedDiff> {
        let raw = self.diffs.fetch(&self.backend, &annotation.commit, file)?;
        let condensed = match &raw {
            Some(text) => diff::condense(text, line_of_interest),
            None => diff::condense("", line_of_interest),
        };
        Ok(condensed)
    }

    /// Share of the file's current lines last touched by each author, in
    /// percent.
    pub fn ownership(&self, file: &Path) -> BackendResult<BTreeMap<String, f64>> {
        let index = self.annotations_for(file)?;
        let total = index.len();
        let mut lines_by_author: BTreeMap<String, usize> = BTreeMap::new();
        for annotation in index.values() {
            *lines_by_author.entry(annotation.author.clone()).or_insert(0) += 1;
        }

        Ok(lines_by_author
            .into_iter()
            .map(|(author, lines)| (author, (lines as f64 / total as f64) * 100.0))
            .collect())
    }
}
