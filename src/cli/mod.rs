//! CLI command definitions and handlers

use crate::annotate::Annotator;
use crate::models::LineAnnotation;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Blamelens - per-line git attribution with condensed commit diffs
#[derive(Parser, Debug)]
#[command(name = "blamelens")]
#[command(
    version,
    about = "Show which commit last touched a line, and what that commit changed",
    after_help = "\
Examples:
  blamelens line src/main.rs 42            Who last touched line 42
  blamelens diff src/main.rs 42            Condensed diff of that commit
  blamelens annotate src/main.rs           Attribution for every line
  blamelens ownership src/main.rs          Author share of current lines
  blamelens line src/main.rs 42 -f json    JSON output for scripting"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the commit that last touched one line
    Line {
        /// File inside a git work tree
        file: PathBuf,

        /// Line number (1-indexed)
        line: u32,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Show the condensed diff of the commit that last touched one line
    Diff {
        /// File inside a git work tree
        file: PathBuf,

        /// Line number (1-indexed)
        line: u32,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// List attribution for every line of a file
    Annotate {
        /// File inside a git work tree
        file: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Show what share of the file's current lines each author owns
    Ownership {
        /// File inside a git work tree
        file: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Line { file, line, format } => run_line(&file, line, &format),
        Commands::Diff { file, line, format } => run_diff(&file, line, &format),
        Commands::Annotate { file, format } => run_annotate(&file, &format),
        Commands::Ownership { file, format } => run_ownership(&file, &format),
    }
}

/// Resolve the file to an absolute path so pathspecs stay rooted at the
/// work tree regardless of the invocation directory.
fn resolve_file(file: &Path) -> Result<PathBuf> {
    file.canonicalize()
        .with_context(|| format!("File not found: {}", file.display()))
}

fn open_session(file: &Path) -> Result<Annotator> {
    Annotator::open(file).with_context(|| format!("Not inside a git repository: {}", file.display()))
}

fn lookup(annotator: &Annotator, file: &Path, line: u32) -> Result<Option<LineAnnotation>> {
    annotator
        .annotation_for(file, line)
        .with_context(|| format!("Failed to attribute {}:{}", file.display(), line))
}

fn run_line(file: &Path, line: u32, format: &str) -> Result<()> {
    let file = resolve_file(file)?;
    let annotator = open_session(&file)?;

    match lookup(&annotator, &file, line)? {
        Some(annotation) => {
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&annotation)?);
            } else {
                println!("{}: {}", annotation.line, annotation);
            }
        }
        None => println!("line {line}: nothing to show"),
    }
    Ok(())
}

fn run_diff(file: &Path, line: u32, format: &str) -> Result<()> {
    let file = resolve_file(file)?;
    let annotator = open_session(&file)?;

    let Some(annotation) = lookup(&annotator, &file, line)? else {
        println!("line {line}: nothing to show");
        return Ok(());
    };

    // Match against the line's current text, as an editor hover would.
    let line_text = current_line_text(&file, line);
    let condensed = annotator.diff_for(&annotation, &file, line_text.as_deref())?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&condensed)?);
    } else {
        println!("{}", annotation);
        println!("{}", condensed.rendered);
    }
    Ok(())
}

fn run_annotate(file: &Path, format: &str) -> Result<()> {
    let file = resolve_file(file)?;
    let annotator = open_session(&file)?;
    let index = annotator
        .annotations_for(&file)
        .with_context(|| format!("Failed to attribute {}", file.display()))?;

    if format == "json" {
        let annotations: Vec<&LineAnnotation> = index.values().collect();
        println!("{}", serde_json::to_string_pretty(&annotations)?);
    } else {
        for annotation in index.values() {
            println!("{:>5}: {}", annotation.line, annotation);
        }
    }
    Ok(())
}

fn run_ownership(file: &Path, format: &str) -> Result<()> {
    let file = resolve_file(file)?;
    let annotator = open_session(&file)?;
    let ownership = annotator
        .ownership(&file)
        .with_context(|| format!("Failed to attribute {}", file.display()))?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&ownership)?);
    } else {
        for (author, share) in &ownership {
            println!("{share:6.1}%  {author}");
        }
    }
    Ok(())
}

/// Current text of `line` in the working copy, if readable.
fn current_line_text(file: &Path, line: u32) -> Option<String> {
    let content = std::fs::read_to_string(file).ok()?;
    content
        .lines()
        .nth(line.saturating_sub(1) as usize)
        .map(str::to_string)
}
