//! Git backend module
//!
//! Everything that touches git lives here: the subprocess backend with its
//! fixed argument vectors, the blame porcelain parser, and per-commit diff
//! fetching and condensation.
//!
//! # Example
//!
//! ```no_run
//! use blamelens::git::{blame, GitBackend};
//! use std::path::Path;
//!
//! let backend = GitBackend::discover(Path::new("src/main.rs")).unwrap();
//! let dump = backend.blame_porcelain(Path::new("src/main.rs")).unwrap();
//! let index = blame::parse_porcelain(&dump);
//! ```

pub mod backend;
pub mod blame;
pub mod diff;

pub use backend::{BackendError, BackendResult, GitBackend};
pub use blame::CommitMetaTable;
pub use diff::DiffFetcher;
