//! Line-buffered input with committed-parse expiration.
//!
//! A [`Source`] retains a window of lines. Outside a `try` scope, every
//! successful match commits: the trampoline expires the source at the new
//! cursor, releasing lines before it so an unbounded stream parses in
//! bounded memory. Inside a `try` scope the freeze counter suspends
//! expiration, so a failed attempt can be retried from before the scope.
//!
//! Reads through the discard frontier yield [`ReadError::Expired`], which the
//! trampoline demotes to an ordinary match failure: a grammar that backtracks
//! past its commit point loses, it does not crash.

use std::io::{self, BufRead};

use crate::cursor::{Iter, Range, END_COL, FLOAT_LINE};
use crate::diagnostics::{MatchError, WeftError};

/// Width of the escaped source excerpt in trace records.
pub(crate) const PREVIEW_WIDTH: usize = 13;

/// A failed source read. `Expired` is recoverable (the engine folds it into
/// a match failure); `Io` aborts the parse.
#[derive(Debug)]
pub enum ReadError {
    /// The cursor points into content released by [`Source::expire`].
    Expired { at: Iter },
    /// The underlying stream failed while lazily fetching a line.
    Io(io::Error),
}

impl From<io::Error> for ReadError {
    fn from(err: io::Error) -> Self {
        ReadError::Io(err)
    }
}

/// The input to a single parse: an in-memory text or a lazily-read stream,
/// both presented as 1-indexed lines and columns.
pub struct Source {
    /// Retained lines, newline-terminated except possibly the last.
    /// Logical line `zero + k + 1` lives at `lines[k]`.
    lines: Vec<String>,
    reader: Option<Box<dyn BufRead>>,
    exhausted: bool,
    /// Nesting depth of active `try` scopes; expiration is a no-op above zero.
    frozen: u32,
    /// Number of lines discarded so far.
    zero: usize,
    /// Rightmost expired column on the first retained line.
    right: usize,
}

impl Source {
    /// An in-memory source. The whole text is available immediately.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(String::from).collect(),
            reader: None,
            exhausted: true,
            frozen: 0,
            zero: 0,
            right: 0,
        }
    }

    /// A line-oriented stream, read lazily as the parse advances.
    pub fn from_reader(reader: Box<dyn BufRead>) -> Self {
        Self {
            lines: Vec::new(),
            reader: Some(reader),
            exhausted: false,
            frozen: 0,
            zero: 0,
            right: 0,
        }
    }

    /// The first position: `(1, 1)`.
    pub fn start(&self) -> Iter {
        Iter::start()
    }

    /// The floating end sentinel; compare via unification only.
    pub fn end(&self) -> Iter {
        Iter::float_end()
    }

    /// Number of lines discarded by expiration so far.
    pub fn discarded_lines(&self) -> usize {
        self.zero
    }

    /// Rightmost expired column on the first retained line.
    pub fn expired_columns(&self) -> usize {
        self.right
    }

    /// Current `try`-scope nesting depth.
    pub fn frozen_depth(&self) -> u32 {
        self.frozen
    }

    /// Enters a `try` scope: suspends expiration.
    pub fn freeze(&mut self) {
        self.frozen += 1;
    }

    /// Leaves a `try` scope.
    pub fn thaw(&mut self) {
        debug_assert!(self.frozen > 0, "thaw without matching freeze");
        self.frozen = self.frozen.saturating_sub(1);
    }

    fn is_expired(&self, at: Iter) -> bool {
        at.line <= self.zero || (at.line == self.zero + 1 && at.col < self.right)
    }

    /// Fetches lines from the reader until logical `line` is buffered or the
    /// stream ends.
    fn fill_to(&mut self, line: usize) -> io::Result<()> {
        while !self.exhausted && self.zero + self.lines.len() < line {
            let reader = match self.reader.as_mut() {
                Some(reader) => reader,
                None => {
                    self.exhausted = true;
                    break;
                }
            };
            let mut buf = String::new();
            if reader.read_line(&mut buf)? == 0 {
                self.exhausted = true;
            } else {
                self.lines.push(buf);
            }
        }
        Ok(())
    }

    /// Reads the character at `at`, returning it with the following cursor,
    /// or `None` at end of input. The cursor wraps to `(line + 1, 1)` after
    /// the last character of a line.
    pub fn next(&mut self, at: Iter) -> Result<Option<(char, Iter)>, ReadError> {
        if self.is_expired(at) {
            return Err(ReadError::Expired { at });
        }
        self.fill_to(at.line)?;
        let line = match self.lines.get(at.line - self.zero - 1) {
            Some(line) => line,
            None => return Ok(None),
        };
        let mut chars = line.chars();
        let c = match chars.nth(at.col - 1) {
            Some(c) => c,
            None => return Ok(None),
        };
        let next = if chars.next().is_none() {
            Iter::new(at.line + 1, 1)
        } else {
            Iter::new(at.line, at.col + 1)
        };
        Ok(Some((c, next)))
    }

    /// True iff no character is available at `at` and the stream is at end.
    pub fn done(&mut self, at: Iter) -> Result<bool, ReadError> {
        Ok(self.next(at)?.is_none())
    }

    /// The substring covered by a single-line range. `FLOAT_LINE` in the stop
    /// cursor unifies with the start's line; `END_COL` unifies with the end
    /// of the line body (the trailing newline is not part of the body).
    /// Ranges spanning lines are a grammar configuration error.
    pub(crate) fn slice(&mut self, range: Range) -> Result<String, MatchError> {
        let start = range.start;
        let stop = range.stop.unify(start);
        if stop.line != start.line {
            return Err(WeftError::config(format!(
                "range slice must stay within one line (got lines {} and {})",
                start.line, stop.line
            ))
            .into());
        }
        if self.is_expired(start) {
            return Err(MatchError::Expired);
        }
        self.fill_to(start.line).map_err(ReadError::from)?;
        let line = match self.lines.get(start.line - self.zero - 1) {
            Some(line) => line,
            None => return Ok(String::new()),
        };
        let body = line.strip_suffix('\n').unwrap_or(line);
        let body_len = body.chars().count();
        let stop_col = if stop.col == END_COL {
            body_len + 1
        } else {
            stop.col.min(body_len + 1)
        };
        if stop_col <= start.col {
            return Ok(String::new());
        }
        Ok(body
            .chars()
            .skip(start.col - 1)
            .take(stop_col - start.col)
            .collect())
    }

    /// Advances the discard frontier through `at`. A no-op while frozen.
    ///
    /// Lines strictly before `at.line` are released. The rightmost-expired
    /// column advances only when lines were actually dropped or the cursor
    /// sits beyond the current frontier on the first retained line.
    pub fn expire(&mut self, at: Iter) {
        if self.frozen > 0 || at.line == FLOAT_LINE || at.line <= self.zero {
            return;
        }
        let n = at.line - self.zero;
        if n > 1 {
            let drop = (n - 1).min(self.lines.len());
            self.lines.drain(..drop);
            self.zero += n - 1;
            self.right = at.col;
        } else if at.col > self.right {
            self.right = at.col;
        }
    }

    /// An escaped, fixed-width excerpt at `at` for trace records. Diagnostic
    /// only: read problems render as placeholders instead of propagating.
    pub(crate) fn preview(&mut self, at: Iter) -> String {
        let mut out = String::new();
        let mut cur = at;
        while out.chars().count() < PREVIEW_WIDTH {
            match self.next(cur) {
                Ok(Some((c, next))) => {
                    out.extend(c.escape_debug());
                    cur = next;
                }
                Ok(None) => break,
                Err(ReadError::Expired { .. }) => {
                    out.push_str("<expired>");
                    break;
                }
                Err(ReadError::Io(_)) => {
                    out.push_str("<io error>");
                    break;
                }
            }
        }
        let mut out: String = out.chars().take(PREVIEW_WIDTH).collect();
        while out.chars().count() < PREVIEW_WIDTH {
            out.push(' ');
        }
        out
    }
}
