//! Git subprocess backend
//!
//! Invokes the `git` binary with fixed argument vectors and hands back raw
//! text. Repository discovery goes through libgit2 so any path inside the
//! work tree resolves to the same root; everything else is plain
//! `std::process::Command` run from that root.

use git2::Repository;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from invoking the version-control backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to open git repository at {path:?}: {source}")]
    Discover {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Repository has no working directory (bare repo?)")]
    BareRepository,

    #[error("Failed to launch git: {0}")]
    Launch(#[from] std::io::Error),

    #[error("git {command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("git produced non-UTF-8 output: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Convenience alias for results that bubble `BackendError`.
pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to one repository's git executable.
///
/// Holds only the work-tree root; every invocation is a fresh subprocess
/// run from that root, so the handle is freely shareable across threads.
pub struct GitBackend {
    root: PathBuf,
}

impl GitBackend {
    /// Discover the repository containing `path` (the path itself or any
    /// ancestor may be the work-tree root).
    pub fn discover(path: &Path) -> BackendResult<Self> {
        // Discovery walks up from a directory; start from the parent when
        // handed a file.
        let start = if path.is_file() {
            path.parent().unwrap_or(path)
        } else {
            path
        };
        let repo = Repository::discover(start).map_err(|source| BackendError::Discover {
            path: path.to_path_buf(),
            source,
        })?;
        let root = repo
            .workdir()
            .ok_or(BackendError::BareRepository)?
            .to_path_buf();
        debug!("Opened git repository at {:?}", root);
        Ok(Self { root })
    }

    /// The work-tree root all invocations run from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reduce `file` to a pathspec relative to the work-tree root.
    ///
    /// Absolute paths are stripped of the root prefix; relative paths are
    /// taken as already root-relative.
    fn rel_path<'a>(&self, file: &'a Path) -> &'a Path {
        file.strip_prefix(&self.root).unwrap_or(file)
    }

    /// Run git with the given arguments, requiring a zero exit status.
    fn run(&self, args: &[&str]) -> BackendResult<String> {
        debug!("Running git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(BackendError::CommandFailed {
                command: args.first().unwrap_or(&"git").to_string(),
                status: output.status,
                stderr,
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }

    /// Resolve the currently checked-out revision.
    ///
    /// The returned value keys the attribution cache: a new head is a new
    /// key, which strands stale entries without explicit invalidation.
    pub fn head_ref(&self) -> BackendResult<String> {
        Ok(self.run(&["rev-parse", "HEAD"])?.trim().to_string())
    }

    /// Fetch the porcelain blame dump for one file.
    pub fn blame_porcelain(&self, file: &Path) -> BackendResult<String> {
        let rel = self.rel_path(file);
        let rel = rel.to_string_lossy();
        self.run(&["blame", "-p", "--", &rel])
    }

    /// Fetch the diff one commit introduced to one file: the diff between
    /// the commit's first parent and the commit itself, scoped to `file`.
    ///
    /// A non-zero exit (commit unknown, file absent at that revision) is an
    /// expected outcome and comes back as `Ok(None)`, never an error.
    pub fn commit_diff(&self, commit: &str, file: &Path) -> BackendResult<Option<String>> {
        let rel = self.rel_path(file);
        let rel = rel.to_string_lossy();
        let revspec = format!("{commit}^!");
        let output = Command::new("git")
            .args(["diff", &revspec, "--", &rel])
            .current_dir(&self.root)
            .output()?;

        if !output.status.success() {
            warn!(
                "git diff {} failed for {:?}: {}",
                revspec,
                file,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        Ok(Some(String::from_utf8(output.stdout)?))
    }
}
