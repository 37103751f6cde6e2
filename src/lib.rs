//! Blamelens - per-line git attribution with condensed commit diffs
//!
//! Attributes each line of a file in a git work tree to the commit that
//! last touched it, and renders that commit's diff to the file in a
//! condensed, scannable form. Built as a library with a thin CLI on top so
//! editor hosts and scripts consume the same engine.
//!
//! # Example
//!
//! ```no_run
//! use blamelens::Annotator;
//! use std::path::Path;
//!
//! let annotator = Annotator::open(Path::new("src/main.rs")).unwrap();
//! if let Some(annotation) = annotator
//!     .annotation_for(Path::new("src/main.rs"), 42)
//!     .unwrap()
//! {
//!     let diff = annotator
//!         .diff_for(&annotation, Path::new("src/main.rs"), None)
//!         .unwrap();
//!     println!("{annotation}\n{}", diff.rendered);
//! }
//! ```

pub mod annotate;
pub mod cache;
pub mod cli;
pub mod git;
pub mod models;

pub use annotate::Annotator;
pub use git::{BackendError, BackendResult, GitBackend};
pub use models::{AttributionIndex, CommitMeta, CondensedDiff, LineAnnotation};
