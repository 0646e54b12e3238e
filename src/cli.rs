//! The weft command-line interface.
//!
//! This module is the entry point for all CLI commands and orchestrates the
//! core library against the built-in demonstration grammar.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::process;

use clap::Parser;
use miette::Report;

use crate::cli::args::{Command, WeftArgs};
use crate::diagnostics::WeftError;
use crate::engine::{Outcome, ParsePipeline, SharedTrace, StderrTrace};
use crate::grammar::Grammar;
use crate::source::Source;
use crate::value::{Item, Value};

pub mod args;
pub mod demo;

/// The main entry point for the CLI.
pub fn run() {
    let args = WeftArgs::parse();

    let result = match args.command {
        Command::Run {
            file,
            stream,
            no_cache,
        } => handle_run(&file, stream, no_cache),
        Command::Trace { file } => handle_trace(&file),
        Command::Check { file, stream } => handle_check(&file, stream),
    };

    if let Err(error) = result {
        print_error(error);
        process::exit(1);
    }
}

/// Prints a WeftError with full miette diagnostics.
pub fn print_error(error: WeftError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}

fn open_source(file: &Path, stream: bool) -> Result<Source, WeftError> {
    if stream {
        Ok(Source::from_reader(Box::new(BufReader::new(File::open(
            file,
        )?))))
    } else {
        Ok(Source::from_text(&fs::read_to_string(file)?))
    }
}

fn parse_file(file: &Path, pipeline: &ParsePipeline, stream: bool) -> Result<Outcome, WeftError> {
    let mut grammar = Grammar::new();
    let root = demo::config_grammar(&mut grammar, stream);
    let mut source = open_source(file, stream)?;
    pipeline.parse(&grammar, root, &mut source)
}

fn print_bindings(value: &Value) {
    for item in value.items() {
        if let Item::List(pair) = item {
            if let [Item::Str(key), Item::Str(val)] = pair.as_slice() {
                println!("{key} = {val}");
            }
        }
    }
}

fn handle_run(file: &Path, stream: bool, no_cache: bool) -> Result<(), WeftError> {
    let mut pipeline = if stream {
        ParsePipeline::committing()
    } else {
        ParsePipeline::new()
    };
    pipeline.cache = !no_cache;

    match parse_file(file, &pipeline, stream)? {
        Outcome::Success { value, .. } => {
            print_bindings(&value);
            Ok(())
        }
        Outcome::Failure(summary) => Err(WeftError::NoMatch {
            farthest: summary.farthest,
            expected: summary.expected,
        }),
    }
}

fn handle_trace(file: &Path) -> Result<(), WeftError> {
    let mut pipeline = ParsePipeline::new();
    pipeline.trace = Some(SharedTrace::new(StderrTrace));

    match parse_file(file, &pipeline, false)? {
        Outcome::Success { value, .. } => {
            print_bindings(&value);
            Ok(())
        }
        Outcome::Failure(summary) => Err(WeftError::NoMatch {
            farthest: summary.farthest,
            expected: summary.expected,
        }),
    }
}

fn handle_check(file: &Path, stream: bool) -> Result<(), WeftError> {
    let pipeline = if stream {
        ParsePipeline::committing()
    } else {
        ParsePipeline::new()
    };

    match parse_file(file, &pipeline, stream)? {
        Outcome::Success { value, .. } => {
            println!("ok ({} bindings)", value.len());
            Ok(())
        }
        Outcome::Failure(summary) => {
            println!("no match: expected {} at {}", summary.expected, summary.farthest);
            process::exit(2);
        }
    }
}
