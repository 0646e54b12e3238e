#![allow(dead_code)]

//! Shared helpers for the weft integration test suites.

use std::cell::RefCell;
use std::rc::Rc;

use weft::{Outcome, ParsePipeline, SharedTrace, TraceBuffer, TraceSink, Value};

/// A pipeline that records its dispatch trace, plus the handle to read the
/// records back after the parse.
pub fn traced_pipeline(commit: bool, cache: bool) -> (ParsePipeline, Rc<RefCell<TraceBuffer>>) {
    let buffer = Rc::new(RefCell::new(TraceBuffer::new()));
    let sink: Rc<RefCell<dyn TraceSink>> = buffer.clone();
    let pipeline = ParsePipeline {
        cache,
        commit,
        trace: Some(SharedTrace(sink)),
    };
    (pipeline, buffer)
}

pub fn trace_lines(buffer: &Rc<RefCell<TraceBuffer>>) -> Vec<String> {
    buffer.borrow().lines.clone()
}

/// Unwraps a successful outcome into its value.
pub fn success_value(outcome: Outcome) -> Value {
    match outcome {
        Outcome::Success { value, .. } => value,
        Outcome::Failure(summary) => {
            panic!("expected success, failed at {}: {}", summary.farthest, summary.expected)
        }
    }
}

/// Renders each top-level item for compact assertions.
pub fn rendered_items(value: &Value) -> Vec<String> {
    value.items().map(|item| item.to_string()).collect()
}
