//! The unified diagnostic surface of the engine.
//!
//! Ordinary parse failure is not an error: it travels through the engine as
//! the `Failure` message and surfaces as [`Outcome::Failure`](crate::Outcome).
//! [`WeftError`] covers the conditions that abort a parse outright: a `Fail`
//! matcher firing, a misconfigured grammar, or an I/O problem in the
//! underlying stream. `parse_one` additionally folds an ordinary failure into
//! [`WeftError::NoMatch`] for callers that only want a value.
//!
//! Expired-content reads are internal: they are represented by
//! [`ReadError::Expired`](crate::source::ReadError), demoted to `Failure` at
//! every trampoline dispatch, and never appear in this enum.

use miette::Diagnostic;
use thiserror::Error;

use crate::cursor::Iter;
use crate::source::ReadError;

/// An aborting engine error. See the module docs for the taxonomy.
#[derive(Debug, Error, Diagnostic)]
pub enum WeftError {
    /// Raised by a `Fail` matcher: the grammar decided the input is
    /// unrecoverable. Never demoted to an ordinary failure.
    #[error("parse aborted at {at}: {message}")]
    #[diagnostic(code(weft::parser))]
    Parser { message: String, at: Iter },

    /// A malformed grammar or an unsupported engine configuration.
    #[error("grammar configuration error: {message}")]
    #[diagnostic(
        code(weft::config),
        help("this is a grammar construction problem, not a property of the input")
    )]
    Config { message: String },

    /// `parse_one` found no successful parse; reports the farthest failure.
    #[error("no match: expected {expected} at {farthest}")]
    #[diagnostic(code(weft::no_match))]
    NoMatch { farthest: Iter, expected: String },

    /// The underlying input stream failed.
    #[error("input error: {0}")]
    #[diagnostic(code(weft::io))]
    Io(#[from] std::io::Error),
}

impl WeftError {
    pub fn parser(message: impl Into<String>, at: Iter) -> Self {
        Self::Parser {
            message: message.into(),
            at,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// The fallible result of a single protocol handler call.
///
/// `Expired` is the one recoverable case: the trampoline folds it into the
/// `Failure` message at the dispatch boundary. `Abort` propagates to the
/// caller untouched.
#[derive(Debug)]
pub(crate) enum MatchError {
    Expired,
    Abort(WeftError),
}

impl From<ReadError> for MatchError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::Expired { .. } => MatchError::Expired,
            ReadError::Io(err) => MatchError::Abort(WeftError::Io(err)),
        }
    }
}

impl From<WeftError> for MatchError {
    fn from(err: WeftError) -> Self {
        MatchError::Abort(err)
    }
}
