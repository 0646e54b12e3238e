//! Trace output plumbing for the debug overlay.
//!
//! The engine emits one line per dispatch step through a [`TraceSink`].
//! Sinks are shared via [`SharedTrace`] so the caller keeps a handle to the
//! buffer while the pipeline writes to it.

use std::cell::RefCell;
use std::rc::Rc;

/// Receives trace records, one line at a time.
pub trait TraceSink {
    fn emit(&mut self, line: &str);
}

/// Collects trace records into memory, for tests and programmatic capture.
#[derive(Debug, Default)]
pub struct TraceBuffer {
    pub lines: Vec<String>,
}

impl TraceBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TraceSink for TraceBuffer {
    fn emit(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Writes trace records to stderr, for CLI use.
pub struct StderrTrace;

impl TraceSink for StderrTrace {
    fn emit(&mut self, line: &str) {
        eprintln!("{line}");
    }
}

/// A shared handle to a trace sink.
#[derive(Clone)]
pub struct SharedTrace(pub Rc<RefCell<dyn TraceSink>>);

impl SharedTrace {
    pub fn new(sink: impl TraceSink + 'static) -> Self {
        SharedTrace(Rc::new(RefCell::new(sink)))
    }

    pub fn emit(&self, line: &str) {
        self.0.borrow_mut().emit(line);
    }
}
