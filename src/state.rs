//! Per-attempt matcher progress.
//!
//! A state records how far a single attempt of a matcher has advanced, in
//! just enough detail for the matcher to be re-entered for its *next*
//! alternative. States are plain comparable values: together with the
//! matcher identity and the cursor they form the result-cache key, so two
//! attempts with equal states are interchangeable by construction.

use crate::cursor::Iter;
use crate::value::Value;

/// One completed child inside a sequence or repetition: where it ended, the
/// state it finished in (for re-entry), and what it produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Part {
    pub end: Iter,
    pub state: MatcherState,
    pub value: Value,
}

/// Progress of a single matcher attempt.
///
/// `Clean` and `Dirty` are shared by every matcher kind: never executed, and
/// exhausted. The remaining variants belong to the kinds that delegate to
/// children and must remember how to resume them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatcherState {
    /// Not yet executed.
    Clean,
    /// No further alternatives.
    Dirty,
    /// An alternation part-way through its branches. `resume` holds the
    /// yielding branch's final state between a success and a re-entry.
    Alt {
        origin: Iter,
        index: usize,
        resume: Option<Box<MatcherState>>,
    },
    /// A sequence with a stack of completed children.
    Seq { origin: Iter, parts: Vec<Part> },
    /// A greedy repetition with a stack of completed iterations.
    Repeat { origin: Iter, parts: Vec<Part> },
    /// A transform wrapping its child's state.
    Map { origin: Iter, inner: Box<MatcherState> },
    /// A `try` scope wrapping its child's state.
    Try { inner: Box<MatcherState> },
}

impl MatcherState {
    pub fn is_clean(&self) -> bool {
        matches!(self, MatcherState::Clean)
    }
}
