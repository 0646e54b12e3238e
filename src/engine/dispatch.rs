//! The matcher protocol: `execute`, `succeed`, `fail`.
//!
//! One handler call is one externally visible transition of one matcher.
//! Dispatch is a match over (matcher kind × state kind); transitions inside
//! a matcher are ordinary code. Handlers return a [`Message`] and yield —
//! they never re-enter the trampoline, so grammar depth never becomes host
//! stack depth.
//!
//! Backtracking works through states: a parent stores each completed child's
//! final state and entry cursor, and asks for the child's next alternative
//! by re-executing it with that state. The cache key includes the entry
//! state, so first attempts and resumptions never collide.

use crate::cursor::{Iter, Range};
use crate::diagnostics::{MatchError, WeftError};
use crate::grammar::{Grammar, Matcher, MatcherId};
use crate::source::Source;
use crate::state::{MatcherState, Part};
use crate::value::Value;

use super::message::{Message, FAILURE};

/// The farthest leaf failure seen in this run, for the failure summary.
#[derive(Debug, Clone)]
pub(crate) struct Farthest {
    pub at: Iter,
    pub expected: String,
}

/// Mutable state shared by every handler call in one parse run.
pub(crate) struct ParseContext<'g, 's> {
    pub grammar: &'g Grammar,
    pub source: &'s mut Source,
    /// Commit mode: successful input is expired and `try` scopes are legal.
    pub commit: bool,
    pub farthest: Option<Farthest>,
}

impl ParseContext<'_, '_> {
    fn note_failure(&mut self, at: Iter, expected: &str) {
        let further = match &self.farthest {
            Some(farthest) => at > farthest.at,
            None => true,
        };
        if further {
            self.farthest = Some(Farthest {
                at,
                expected: expected.to_string(),
            });
        }
    }
}

fn mismatch(node: &Matcher, state: &MatcherState, handler: &str) -> MatchError {
    MatchError::Abort(WeftError::config(format!(
        "{node:?} reached {handler} with incompatible state {state:?}"
    )))
}

/// Concatenation of the values produced by a run of completed children.
fn collect(parts: &[Part]) -> Value {
    parts
        .iter()
        .fold(Value::empty(), |acc, part| acc.concat(&part.value))
}

/// Where the child after `parts` starts: the previous child's end, or the
/// parent's own entry cursor.
fn next_start(origin: Iter, parts: &[Part]) -> Iter {
    parts.last().map(|part| part.end).unwrap_or(origin)
}

/// Enter (or re-enter) matcher `id` in `state` at `iter`.
pub(crate) fn execute(
    ctx: &mut ParseContext,
    id: MatcherId,
    state: MatcherState,
    iter: Iter,
) -> Result<Message, MatchError> {
    let grammar: &Grammar = ctx.grammar;
    let node = &grammar[id];
    match (node, state) {
        (Matcher::Literal { text, name }, MatcherState::Clean) => {
            execute_literal(ctx, text, name, iter)
        }
        (Matcher::Literal { .. }, _) => Ok(FAILURE),

        (Matcher::Dot { name }, MatcherState::Clean) => execute_dot(ctx, name, iter),
        (Matcher::Dot { .. }, _) => Ok(FAILURE),

        (Matcher::Pattern { regex, name }, MatcherState::Clean) => {
            execute_pattern(ctx, regex, name, iter)
        }
        (Matcher::Pattern { .. }, _) => Ok(FAILURE),

        (Matcher::Eof { name }, MatcherState::Clean) => {
            if ctx.source.done(iter)? {
                Ok(Message::Success {
                    child_state: MatcherState::Dirty,
                    iter,
                    result: Value::empty(),
                })
            } else {
                ctx.note_failure(iter, name);
                Ok(FAILURE)
            }
        }
        (Matcher::Eof { .. }, _) => Ok(FAILURE),

        (Matcher::Seq { children, .. }, MatcherState::Clean) => {
            let state = MatcherState::Seq {
                origin: iter,
                parts: Vec::new(),
            };
            match children.first() {
                None => Ok(Message::Success {
                    child_state: state,
                    iter,
                    result: Value::empty(),
                }),
                Some(&first) => Ok(Message::Execute {
                    parent: id,
                    parent_state: state,
                    child: first,
                    child_state: MatcherState::Clean,
                    iter,
                }),
            }
        }
        (Matcher::Seq { children, .. }, MatcherState::Seq { origin, parts }) => {
            Ok(resume_seq(id, children, origin, parts))
        }

        (Matcher::Alt { children, .. }, MatcherState::Clean) => match children.first() {
            None => Ok(FAILURE),
            Some(&first) => Ok(Message::Execute {
                parent: id,
                parent_state: MatcherState::Alt {
                    origin: iter,
                    index: 0,
                    resume: None,
                },
                child: first,
                child_state: MatcherState::Clean,
                iter,
            }),
        },
        (
            Matcher::Alt { children, .. },
            MatcherState::Alt {
                origin,
                index,
                resume: Some(resume),
            },
        ) => Ok(Message::Execute {
            parent: id,
            parent_state: MatcherState::Alt {
                origin,
                index,
                resume: None,
            },
            child: children[index],
            child_state: *resume,
            iter: origin,
        }),

        (Matcher::Repeat { child, max, .. }, MatcherState::Clean) => {
            let state = MatcherState::Repeat {
                origin: iter,
                parts: Vec::new(),
            };
            if *max == Some(0) {
                return Ok(Message::Success {
                    child_state: state,
                    iter,
                    result: Value::empty(),
                });
            }
            Ok(Message::Execute {
                parent: id,
                parent_state: state,
                child: *child,
                child_state: MatcherState::Clean,
                iter,
            })
        }
        (Matcher::Repeat { child, .. }, MatcherState::Repeat { origin, parts }) => {
            Ok(resume_repeat(id, *child, origin, parts))
        }

        (Matcher::Map { child, .. }, MatcherState::Clean) => Ok(Message::Execute {
            parent: id,
            parent_state: MatcherState::Map {
                origin: iter,
                inner: Box::new(MatcherState::Clean),
            },
            child: *child,
            child_state: MatcherState::Clean,
            iter,
        }),
        (Matcher::Map { child, .. }, MatcherState::Map { origin, inner }) => Ok(Message::Execute {
            parent: id,
            parent_state: MatcherState::Map {
                origin,
                inner: inner.clone(),
            },
            child: *child,
            child_state: *inner,
            iter: origin,
        }),

        (Matcher::Try { child, name }, MatcherState::Clean) => {
            if !ctx.commit {
                return Err(MatchError::Abort(WeftError::config(format!(
                    "matcher {name} requires a committing pipeline (commit mode is off)"
                ))));
            }
            ctx.source.freeze();
            Ok(Message::Execute {
                parent: id,
                parent_state: MatcherState::Try {
                    inner: Box::new(MatcherState::Clean),
                },
                child: *child,
                child_state: MatcherState::Clean,
                iter,
            })
        }
        (Matcher::Try { child, .. }, MatcherState::Try { inner }) => {
            ctx.source.freeze();
            Ok(Message::Execute {
                parent: id,
                parent_state: MatcherState::Try {
                    inner: inner.clone(),
                },
                child: *child,
                child_state: *inner,
                iter,
            })
        }

        (Matcher::Fail { message, .. }, _) => Err(MatchError::Abort(WeftError::parser(
            message.clone(),
            iter,
        ))),

        (Matcher::Undefined { name }, _) => Err(MatchError::Abort(WeftError::config(format!(
            "matcher '{name}' was declared but never defined"
        )))),

        (node, state) => Err(mismatch(node, &state, "execute")),
    }
}

fn execute_literal(
    ctx: &mut ParseContext,
    text: &str,
    name: &str,
    iter: Iter,
) -> Result<Message, MatchError> {
    let mut cur = iter;
    for expected in text.chars() {
        match ctx.source.next(cur)? {
            Some((c, next)) if c == expected => cur = next,
            _ => {
                ctx.note_failure(cur, name);
                return Ok(FAILURE);
            }
        }
    }
    Ok(Message::Success {
        child_state: MatcherState::Dirty,
        iter: cur,
        result: Value::text(text),
    })
}

fn execute_dot(ctx: &mut ParseContext, name: &str, iter: Iter) -> Result<Message, MatchError> {
    match ctx.source.next(iter)? {
        Some((c, next)) if c != '\n' => Ok(Message::Success {
            child_state: MatcherState::Dirty,
            iter: next,
            result: Value::text(c),
        }),
        _ => {
            ctx.note_failure(iter, name);
            Ok(FAILURE)
        }
    }
}

fn execute_pattern(
    ctx: &mut ParseContext,
    regex: &regex::Regex,
    name: &str,
    iter: Iter,
) -> Result<Message, MatchError> {
    let rest = ctx.source.slice(Range::to_line_end(iter))?;
    match regex.find(&rest) {
        Some(found) => {
            let consumed = found.as_str().chars().count();
            Ok(Message::Success {
                child_state: MatcherState::Dirty,
                iter: Iter::new(iter.line, iter.col + consumed),
                result: Value::text(found.as_str()),
            })
        }
        None => {
            ctx.note_failure(iter, name);
            Ok(FAILURE)
        }
    }
}

/// Backtrack a sequence: re-enter the most recent child for its next
/// alternative, or give up when none remain. Serves both re-entry and the
/// failure handler — asking a completed sequence for its next overall match
/// is exactly a backtrack through its last child.
fn resume_seq(
    id: MatcherId,
    children: &[MatcherId],
    origin: Iter,
    mut parts: Vec<Part>,
) -> Message {
    match parts.pop() {
        None => FAILURE,
        Some(last) => {
            let start = next_start(origin, &parts);
            let index = parts.len();
            Message::Execute {
                parent: id,
                parent_state: MatcherState::Seq { origin, parts },
                child: children[index],
                child_state: last.state,
                iter: start,
            }
        }
    }
}

/// Backtrack a repetition, symmetric to [`resume_seq`].
fn resume_repeat(id: MatcherId, child: MatcherId, origin: Iter, mut parts: Vec<Part>) -> Message {
    match parts.pop() {
        None => FAILURE,
        Some(last) => {
            let start = next_start(origin, &parts);
            Message::Execute {
                parent: id,
                parent_state: MatcherState::Repeat { origin, parts },
                child,
                child_state: last.state,
                iter: start,
            }
        }
    }
}

/// A child delegated-to by `parent` produced `result` ending at `iter`.
pub(crate) fn succeed(
    ctx: &mut ParseContext,
    parent: MatcherId,
    parent_state: MatcherState,
    child_state: MatcherState,
    iter: Iter,
    result: Value,
) -> Result<Message, MatchError> {
    let grammar: &Grammar = ctx.grammar;
    let node = &grammar[parent];
    match (node, parent_state) {
        (Matcher::Seq { children, .. }, MatcherState::Seq { origin, mut parts }) => {
            parts.push(Part {
                end: iter,
                state: child_state,
                value: result,
            });
            if parts.len() == children.len() {
                let result = collect(&parts);
                Ok(Message::Success {
                    child_state: MatcherState::Seq { origin, parts },
                    iter,
                    result,
                })
            } else {
                let index = parts.len();
                Ok(Message::Execute {
                    parent,
                    parent_state: MatcherState::Seq { origin, parts },
                    child: children[index],
                    child_state: MatcherState::Clean,
                    iter,
                })
            }
        }

        (Matcher::Alt { .. }, MatcherState::Alt { origin, index, .. }) => Ok(Message::Success {
            child_state: MatcherState::Alt {
                origin,
                index,
                resume: Some(Box::new(child_state)),
            },
            iter,
            result,
        }),

        (Matcher::Repeat { child, min, max, .. }, MatcherState::Repeat { origin, mut parts }) => {
            let start = next_start(origin, &parts);
            if iter == start {
                // The child matched without consuming; further iterations
                // would never terminate. Settle at the current count.
                return if parts.len() >= *min {
                    let result = collect(&parts);
                    Ok(Message::Success {
                        child_state: MatcherState::Repeat { origin, parts },
                        iter: start,
                        result,
                    })
                } else {
                    Ok(FAILURE)
                };
            }
            parts.push(Part {
                end: iter,
                state: child_state,
                value: result,
            });
            if Some(parts.len()) == *max {
                if parts.len() >= *min {
                    let result = collect(&parts);
                    Ok(Message::Success {
                        child_state: MatcherState::Repeat { origin, parts },
                        iter,
                        result,
                    })
                } else {
                    Ok(resume_repeat(parent, *child, origin, parts))
                }
            } else {
                Ok(Message::Execute {
                    parent,
                    parent_state: MatcherState::Repeat { origin, parts },
                    child: *child,
                    child_state: MatcherState::Clean,
                    iter,
                })
            }
        }

        (Matcher::Map { transform, .. }, MatcherState::Map { origin, .. }) => {
            Ok(Message::Success {
                child_state: MatcherState::Map {
                    origin,
                    inner: Box::new(child_state),
                },
                iter,
                result: transform(result),
            })
        }

        (Matcher::Try { .. }, MatcherState::Try { .. }) => {
            ctx.source.thaw();
            Ok(Message::Success {
                child_state: MatcherState::Try {
                    inner: Box::new(child_state),
                },
                iter,
                result,
            })
        }

        (node, state) => Err(mismatch(node, &state, "succeed")),
    }
}

/// A child delegated-to by `parent` failed.
pub(crate) fn fail(
    ctx: &mut ParseContext,
    parent: MatcherId,
    parent_state: MatcherState,
) -> Result<Message, MatchError> {
    let grammar: &Grammar = ctx.grammar;
    let node = &grammar[parent];
    match (node, parent_state) {
        (Matcher::Seq { children, .. }, MatcherState::Seq { origin, parts }) => {
            Ok(resume_seq(parent, children, origin, parts))
        }

        (Matcher::Alt { children, .. }, MatcherState::Alt { origin, index, .. }) => {
            let next = index + 1;
            if next < children.len() {
                Ok(Message::Execute {
                    parent,
                    parent_state: MatcherState::Alt {
                        origin,
                        index: next,
                        resume: None,
                    },
                    child: children[next],
                    child_state: MatcherState::Clean,
                    iter: origin,
                })
            } else {
                Ok(FAILURE)
            }
        }

        (Matcher::Repeat { child, min, .. }, MatcherState::Repeat { origin, parts }) => {
            if parts.len() >= *min {
                let iter = next_start(origin, &parts);
                let result = collect(&parts);
                Ok(Message::Success {
                    child_state: MatcherState::Repeat { origin, parts },
                    iter,
                    result,
                })
            } else {
                Ok(resume_repeat(parent, *child, origin, parts))
            }
        }

        (Matcher::Map { .. }, MatcherState::Map { .. }) => Ok(FAILURE),

        (Matcher::Try { .. }, MatcherState::Try { .. }) => {
            ctx.source.thaw();
            Ok(FAILURE)
        }

        (node, state) => Err(mismatch(node, &state, "fail")),
    }
}
