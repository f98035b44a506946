//! CLI argument definitions for depsys.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "depsys",
    version,
    about = "Incremental versioned-dependency resolver",
    long_about = "depsys resolves a universe of versioned elements and their dependencies, \
                  reporting what is satisfied, selected and resolved, and what changed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a universe file and print the resolved elements
    Resolve {
        /// Universe file
        file: PathBuf,
        /// Print resolved elements and delta as JSON
        #[arg(long)]
        json: bool,
        /// Do not record or print a delta
        #[arg(long)]
        no_delta: bool,
        /// Resolver settings file (overrides the [resolver] table)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Show what each phase kept, and why elements did not resolve
    Status {
        /// Universe file
        file: PathBuf,
    },

    /// Display the resolved element tree
    Tree {
        /// Universe file
        file: PathBuf,
        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,
        /// Show dependents instead of dependencies
        #[arg(short, long)]
        inverted: bool,
        /// Explain why an identity (or id@version) is resolved
        #[arg(long, value_name = "ID")]
        why: Option<String>,
    },

    /// Resolve OLD, move it incrementally to NEW and print the changes
    Diff {
        /// Universe file to start from
        old: PathBuf,
        /// Universe file to move to
        new: PathBuf,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
