//! The parse pipeline: the public face of the execution engine.
//!
//! A [`ParsePipeline`] selects the dispatch mode — result cache on or off,
//! commit (streaming expiration + `try` scopes) on or off, optional trace
//! overlay — and drives the trampoline over a grammar and a source. The
//! [`parse`] and [`parse_one`] free functions cover the common case with
//! default options.
//!
//! Ordinary failure is a value here: [`Outcome::Failure`] carries the
//! farthest-failure summary. Aborts ([`WeftError`]) are the outer `Result`.

mod dispatch;
mod message;
mod trampoline;
pub mod trace;

pub use trace::{SharedTrace, StderrTrace, TraceBuffer, TraceSink};

use crate::cursor::Iter;
use crate::diagnostics::WeftError;
use crate::grammar::{Grammar, MatcherId};
use crate::source::Source;
use crate::value::Value;

use dispatch::ParseContext;
use trampoline::RunOutcome;

/// Where the parse gave up: the farthest cursor any leaf matcher failed at,
/// and that matcher's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSummary {
    pub farthest: Iter,
    pub expected: String,
}

/// The disposition of a completed parse. An abort never reaches this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The grammar matched; `end` is the cursor after the consumed input.
    Success { value: Value, end: Iter },
    /// No alternative matched.
    Failure(FailureSummary),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// The produced value, if the parse succeeded.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Success { value, .. } => Some(value),
            Outcome::Failure(_) => None,
        }
    }
}

/// A configured engine: one of the enumerated dispatch modes plus the
/// optional debug overlay. Construct once, run any number of parses.
pub struct ParsePipeline {
    /// Memoize child dispatches within each parse.
    pub cache: bool,
    /// Commit mode: expire consumed input after each success and honor
    /// `try` scopes. Off by default; without it the whole input is retained
    /// and `try` matchers are a configuration error.
    pub commit: bool,
    /// Debug overlay: emit a trace record at every dispatch step.
    pub trace: Option<SharedTrace>,
}

impl Default for ParsePipeline {
    fn default() -> Self {
        Self {
            cache: true,
            commit: false,
            trace: None,
        }
    }
}

impl ParsePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// A committing pipeline: streaming expiration on, `try` scopes legal.
    pub fn committing() -> Self {
        Self {
            commit: true,
            ..Self::default()
        }
    }

    /// Runs `root` over `source` to completion.
    pub fn parse(
        &self,
        grammar: &Grammar,
        root: MatcherId,
        source: &mut Source,
    ) -> Result<Outcome, WeftError> {
        let mut ctx = ParseContext {
            grammar,
            source,
            commit: self.commit,
            farthest: None,
        };
        let outcome = trampoline::run(&mut ctx, root, self.cache, self.trace.as_ref())?;
        Ok(match outcome {
            RunOutcome::Success { value, end } => Outcome::Success { value, end },
            RunOutcome::Failure => {
                let summary = match ctx.farthest {
                    Some(farthest) => FailureSummary {
                        farthest: farthest.at,
                        expected: farthest.expected,
                    },
                    None => FailureSummary {
                        farthest: Iter::start(),
                        expected: grammar[root].name().to_string(),
                    },
                };
                Outcome::Failure(summary)
            }
        })
    }

    /// Convenience: parse an in-memory text.
    pub fn parse_text(
        &self,
        grammar: &Grammar,
        root: MatcherId,
        text: &str,
    ) -> Result<Outcome, WeftError> {
        let mut source = Source::from_text(text);
        self.parse(grammar, root, &mut source)
    }
}

/// Parses `text` with the default pipeline (cache on, commit off).
pub fn parse(grammar: &Grammar, root: MatcherId, text: &str) -> Result<Outcome, WeftError> {
    ParsePipeline::default().parse_text(grammar, root, text)
}

/// Parses `text` and returns the first successful value, folding an ordinary
/// failure into [`WeftError::NoMatch`].
pub fn parse_one(grammar: &Grammar, root: MatcherId, text: &str) -> Result<Value, WeftError> {
    match parse(grammar, root, text)? {
        Outcome::Success { value, .. } => Ok(value),
        Outcome::Failure(summary) => Err(WeftError::NoMatch {
            farthest: summary.farthest,
            expected: summary.expected,
        }),
    }
}
