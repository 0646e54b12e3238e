//! weft — a trampolining parser-combinator engine.
//!
//! Small declarative matchers compose into a grammar tree; an explicit
//! stepping dispatcher (the trampoline) walks that tree against a
//! line-oriented source. The engine memoizes sub-parses, backtracks exactly
//! across nested alternatives, and supports committed (streaming) parsing:
//! outside a `try` scope, successfully consumed input is discarded, so
//! unbounded input parses in bounded memory.

pub use crate::diagnostics::WeftError;

pub mod cli;
pub mod cursor;
pub mod diagnostics;
pub mod engine;
pub mod grammar;
pub mod source;
pub mod state;
pub mod value;

pub use cursor::{Iter, Range, END_COL, FLOAT_LINE};
pub use engine::{
    parse, parse_one, FailureSummary, Outcome, ParsePipeline, SharedTrace, StderrTrace,
    TraceBuffer, TraceSink,
};
pub use grammar::{Grammar, Matcher, MatcherId};
pub use source::{ReadError, Source};
pub use state::MatcherState;
pub use value::{Item, Value};
