//! ant: line annotations for source trees
//!
//! **ant attaches free-text notes to specific lines of source files without
//! touching the files themselves.**
//!
//! Annotations live in a shadow directory (`.ant/` by default) that mirrors
//! the source tree: notes for `src/lib.rs` land in `.ant/src/lib.rs.ant`.
//! Each log is append-only, so adding a note never rewrites existing data;
//! superseded notes are compacted away on the next read.
//!
//! # Model
//!
//! - **Append-only**: `add` writes one record to the end of the file's log
//! - **Last write wins**: re-annotating a line supersedes the earlier note
//! - **Anchored**: every note snapshots the line it annotated, so drift after
//!   source edits stays visible
//! - **Versioned**: a store records the version that created it and refuses
//!   to open under any other
//!
//! # Examples
//!
//! ```bash
//! # Create the store
//! ant init
//!
//! # Annotate line 14 of a file
//! ant add src/parser.rs:14 "this lookahead is load-bearing"
//!
//! # Show a file's annotations (--json for editor integrations)
//! ant list src/parser.rs
//!
//! # Remove the note on line 14
//! ant rm src/parser.rs:14
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: record format, location addressing, store metadata, and the
//!   annotation store itself
//! - `cli`: clap surface consumed by [`run`]

pub mod core;

mod cli;

use core::error::AntError;
use core::location::FileLocation;
use core::record::Annotation;
use core::store::AnnotationStore;

use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

/// One `list --json` element, keyed the way editor integrations expect.
#[derive(Serialize)]
struct AnnotationRow<'a> {
    annotation: &'a str,
    source: &'a str,
    row: u32,
}

pub fn run() -> Result<(), AntError> {
    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init => {
            if AnnotationStore::init(&cli.output_dir)? {
                println!(
                    "Successfully initialized ant in {}",
                    cli.output_dir.display()
                );
            } else {
                println!(
                    "ant has already been initialized in {}",
                    cli.output_dir.display()
                );
            }
        }
        cli::Command::Add {
            location,
            annotation,
        } => {
            let location = FileLocation::parse(&location)?;
            let store = AnnotationStore::open(&cli.source_dir, &cli.output_dir)?;
            store.append(&location, &annotation)?;
            println!("Successfully added annotation to {}", location);
        }
        cli::Command::Rm { location } => {
            let location = FileLocation::parse(&location)?;
            let store = AnnotationStore::open(&cli.source_dir, &cli.output_dir)?;
            store.remove(&location)?;
            println!("Successfully removed annotation from {}", location);
        }
        cli::Command::List { path, json } => {
            let store = AnnotationStore::open(&cli.source_dir, &cli.output_dir)?;
            let records = store.list(&path)?;
            if json {
                render_json(&records);
            } else {
                render_listing(&path, &records);
            }
        }
    }
    Ok(())
}

fn render_listing(path: &Path, records: &[Annotation]) {
    if records.is_empty() {
        println!("No annotations for file {}", path.display());
        return;
    }
    for record in records {
        println!(
            "{}",
            format!("{}:{}", path.display(), record.row())
                .bright_cyan()
                .bold()
        );
        // Records read back from older logs carry no anchor snapshot.
        if !record.anchor().is_empty() {
            println!("source: {}", record.anchor());
        }
        println!("> {}", record.text());
        println!();
    }
}

fn render_json(records: &[Annotation]) {
    let rows: Vec<AnnotationRow> = records
        .iter()
        .map(|record| AnnotationRow {
            annotation: record.text(),
            source: record.anchor(),
            row: record.row(),
        })
        .collect();
    println!("{}", serde_json::to_string(&rows).unwrap());
}
