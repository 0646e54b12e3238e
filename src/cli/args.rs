//! Defines the command-line arguments and subcommands for the weft CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "weft",
    version,
    about = "A trampolining parser-combinator engine."
)]
pub struct WeftArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a key=value config file with the built-in grammar and print
    /// the bindings.
    Run {
        /// The file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Read lazily and expire consumed lines (bounded memory).
        #[arg(long)]
        stream: bool,
        /// Disable the result cache.
        #[arg(long)]
        no_cache: bool,
    },
    /// Parse while emitting a dispatch trace record per step to stderr.
    Trace {
        /// The file to parse.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Parse and report only the disposition: success or farthest failure.
    Check {
        /// The file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Read lazily and expire consumed lines.
        #[arg(long)]
        stream: bool,
    },
}
