//! CLI struct definitions for the ant command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "ant",
    version = env!("CARGO_PKG_VERSION"),
    about = "Attach notes to individual source lines without editing the source. Annotations live in append-only logs under a shadow tree that mirrors your project. 🐜"
)]
pub(crate) struct Cli {
    /// Directory the annotated sources live under.
    #[clap(short = 's', long = "source", global = true, default_value = ".")]
    pub source_dir: PathBuf,

    /// Directory the annotation store lives under.
    #[clap(short = 'o', long = "output", global = true, default_value = ".ant")]
    pub output_dir: PathBuf,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create the annotation store (safe to re-run)
    #[clap(name = "init", visible_alias = "i")]
    Init,

    /// Annotate a line, replacing any previous note on that line
    #[clap(name = "add", visible_alias = "a")]
    Add {
        /// Where to annotate, as filepath:row (row is 1-based)
        #[clap(value_name = "filepath:row")]
        location: String,
        /// The annotation text (a single line)
        annotation: String,
    },

    /// Remove the annotation on a line
    #[clap(name = "rm", visible_alias = "r")]
    Rm {
        /// Which annotation to remove, as filepath:row
        #[clap(value_name = "filepath:row")]
        location: String,
    },

    /// Show a file's annotations
    #[clap(name = "list", visible_alias = "l")]
    List {
        /// Source file whose annotations to show
        path: PathBuf,
        /// Emit a machine-readable JSON array instead of text
        #[clap(long)]
        json: bool,
    },
}
