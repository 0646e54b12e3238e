//! The trampoline: a stepping dispatcher over matcher messages.
//!
//! The driver keeps an explicit stack of suspended parents and one current
//! message. Each step either pushes a frame and enters a child, or pops a
//! frame and hands the child's outcome to its parent. Grammar recursion
//! becomes frame depth, never host-stack depth.
//!
//! In cached mode every child entry is keyed by (identity, entry state,
//! cursor); a hit replays the recorded message without re-invoking the
//! child. An expired-content read surfacing from any handler is demoted to
//! the `Failure` message right here; aborts pass through.

use std::collections::HashMap;

use crate::cursor::Iter;
use crate::diagnostics::{MatchError, WeftError};
use crate::grammar::MatcherId;
use crate::state::MatcherState;
use crate::value::Value;

use super::dispatch::{self, ParseContext};
use super::message::{CacheKey, Frame, Message, FAILURE};
use super::trace::SharedTrace;

/// The raw disposition of a completed run.
pub(crate) enum RunOutcome {
    Success { value: Value, end: Iter },
    Failure,
}

/// Demote an expired read to ordinary failure; let aborts through.
fn fold(step: Result<Message, MatchError>) -> Result<Message, WeftError> {
    match step {
        Ok(message) => Ok(message),
        Err(MatchError::Expired) => Ok(FAILURE),
        Err(MatchError::Abort(err)) => Err(err),
    }
}

/// Drive `root` over the context's source until the stack empties.
pub(crate) fn run(
    ctx: &mut ParseContext,
    root: MatcherId,
    use_cache: bool,
    trace: Option<&SharedTrace>,
) -> Result<RunOutcome, WeftError> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut cache: HashMap<CacheKey, Message> = HashMap::new();
    let start = ctx.source.start();
    let mut current = fold(dispatch::execute(ctx, root, MatcherState::Clean, start))?;

    loop {
        match current {
            Message::Execute {
                parent,
                parent_state,
                child,
                child_state,
                iter,
            } => {
                let key = use_cache.then(|| CacheKey {
                    child,
                    state: child_state.clone(),
                    iter,
                });
                let hit = key.as_ref().and_then(|key| cache.get(key)).cloned();
                stack.push(Frame {
                    parent,
                    state: parent_state,
                    key,
                    iter,
                });
                if let Some(sink) = trace {
                    emit_execute(ctx, sink, iter, stack.len(), parent, child);
                }
                current = match hit {
                    Some(message) => message,
                    None => fold(dispatch::execute(ctx, child, child_state, iter))?,
                };
            }

            Message::Success {
                child_state,
                iter,
                result,
            } => {
                if ctx.commit {
                    ctx.source.expire(iter);
                }
                let Some(frame) = stack.pop() else {
                    return Ok(RunOutcome::Success {
                        value: result,
                        end: iter,
                    });
                };
                if let Some(sink) = trace {
                    emit_success(ctx, sink, iter, stack.len() + 1, frame.parent, &result);
                }
                if let Some(key) = frame.key {
                    cache.insert(
                        key,
                        Message::Success {
                            child_state: child_state.clone(),
                            iter,
                            result: result.clone(),
                        },
                    );
                }
                current = fold(dispatch::succeed(
                    ctx,
                    frame.parent,
                    frame.state,
                    child_state,
                    iter,
                    result,
                ))?;
            }

            Message::Failure => {
                let Some(frame) = stack.pop() else {
                    return Ok(RunOutcome::Failure);
                };
                if let Some(sink) = trace {
                    emit_failure(ctx, sink, frame.iter, stack.len() + 1, frame.parent);
                }
                if let Some(key) = frame.key {
                    cache.insert(key, FAILURE);
                }
                current = fold(dispatch::fail(ctx, frame.parent, frame.state))?;
            }
        }
    }
}

fn emit_execute(
    ctx: &mut ParseContext,
    sink: &SharedTrace,
    iter: Iter,
    depth: usize,
    parent: MatcherId,
    child: MatcherId,
) {
    let preview = ctx.source.preview(iter);
    let line = format!(
        "{},{}:{} {} {}{}->{}",
        iter.line,
        iter.col,
        preview,
        depth,
        " ".repeat(depth),
        ctx.grammar[parent].name(),
        ctx.grammar[child].name(),
    );
    sink.emit(&line);
}

fn emit_success(
    ctx: &mut ParseContext,
    sink: &SharedTrace,
    iter: Iter,
    depth: usize,
    parent: MatcherId,
    result: &Value,
) {
    let preview = ctx.source.preview(iter);
    let line = format!(
        "{},{}:{} {} {}{}<-{}",
        iter.line,
        iter.col,
        preview,
        depth,
        " ".repeat(depth),
        ctx.grammar[parent].name(),
        result.summary(10),
    );
    sink.emit(&line);
}

fn emit_failure(
    ctx: &mut ParseContext,
    sink: &SharedTrace,
    iter: Iter,
    depth: usize,
    parent: MatcherId,
) {
    let preview = ctx.source.preview(iter);
    let line = format!(
        "{},{}:{} {} {}{}<-!!!",
        iter.line,
        iter.col,
        preview,
        depth,
        " ".repeat(depth),
        ctx.grammar[parent].name(),
    );
    sink.emit(&line);
}
