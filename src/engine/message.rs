//! The message protocol between matchers and the trampoline.
//!
//! A handler never calls back into the engine; it returns one of these
//! messages and yields. `Execute` suspends the requesting parent on the
//! frame stack; `Success` and `Failure` pop it. Cache values are whole
//! messages, so replaying a hit is indistinguishable from the original
//! dispatch.

use crate::cursor::Iter;
use crate::grammar::MatcherId;
use crate::state::MatcherState;
use crate::value::Value;

/// A dispatch request returned by a protocol handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Delegate to `child`; suspend `parent` until the child resolves.
    Execute {
        parent: MatcherId,
        parent_state: MatcherState,
        child: MatcherId,
        child_state: MatcherState,
        iter: Iter,
    },
    /// The dispatched matcher produced `result` and stopped at `iter`.
    /// `child_state` is its final state, kept by the parent for re-entry.
    Success {
        child_state: MatcherState,
        iter: Iter,
        result: Value,
    },
    /// The dispatched matcher has no (further) match.
    Failure,
}

/// The shared failure message.
pub const FAILURE: Message = Message::Failure;

/// Key under which a child dispatch outcome is memoized: the child's
/// identity, its entry state, and the entry cursor. Entry states distinguish
/// re-entries of backtracking matchers, so the cache never conflates a first
/// attempt with a resumption.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub child: MatcherId,
    pub state: MatcherState,
    pub iter: Iter,
}

/// A suspended parent awaiting its child's outcome. `key` is present in
/// cached mode and names the slot to record the outcome under; `iter` is
/// where the child was entered, kept for trace records.
#[derive(Debug)]
pub struct Frame {
    pub parent: MatcherId,
    pub state: MatcherState,
    pub key: Option<CacheKey>,
    pub iter: Iter,
}
