//! The grammar tree: an arena of immutable matcher nodes.
//!
//! Nodes live in a flat arena and refer to each other by [`MatcherId`], so
//! recursive grammars are plain index cycles with no reference counting.
//! Node identity (the arena index) keys the result cache. The tree is built
//! once, then read-only for the lifetime of every parse run against it.
//!
//! Recursive references use [`Grammar::declare`] to reserve a named slot and
//! [`Grammar::define`] to fill it; executing a slot that was never defined
//! aborts with a configuration error.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use regex::Regex;

use crate::diagnostics::WeftError;
use crate::value::Value;

/// A value transform attached to a `Map` node.
pub type TransformFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Stable identity of a grammar node; the arena index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatcherId(pub(crate) u32);

/// An immutable grammar node. Leaf kinds own their literal or pattern data;
/// composite kinds hold child ids.
#[derive(Clone)]
pub enum Matcher {
    /// Exact text, compared character by character; may span lines if the
    /// text contains newlines.
    Literal { name: String, text: String },
    /// Any single character within the current line.
    Dot { name: String },
    /// An anchored regex matched against the rest of the current line.
    Pattern { name: String, regex: Regex },
    /// Matches only at end of input, consuming nothing.
    Eof { name: String },
    /// Children in order; value is the concatenation.
    Seq { name: String, children: Vec<MatcherId> },
    /// Ordered choice.
    Alt { name: String, children: Vec<MatcherId> },
    /// Greedy repetition between `min` and `max` (unbounded when `None`).
    Repeat {
        name: String,
        child: MatcherId,
        min: usize,
        max: Option<usize>,
    },
    /// Applies a transform to the child's value.
    Map {
        name: String,
        child: MatcherId,
        transform: TransformFn,
    },
    /// A backtracking scope: suspends input expiration while active.
    Try { name: String, child: MatcherId },
    /// Unconditionally aborts the parse with a message.
    Fail { name: String, message: String },
    /// A declared-but-not-yet-defined slot.
    Undefined { name: String },
}

impl Matcher {
    pub fn name(&self) -> &str {
        match self {
            Matcher::Literal { name, .. }
            | Matcher::Dot { name }
            | Matcher::Pattern { name, .. }
            | Matcher::Eof { name }
            | Matcher::Seq { name, .. }
            | Matcher::Alt { name, .. }
            | Matcher::Repeat { name, .. }
            | Matcher::Map { name, .. }
            | Matcher::Try { name, .. }
            | Matcher::Fail { name, .. }
            | Matcher::Undefined { name } => name,
        }
    }

    fn set_name(&mut self, new: String) {
        match self {
            Matcher::Literal { name, .. }
            | Matcher::Dot { name }
            | Matcher::Pattern { name, .. }
            | Matcher::Eof { name }
            | Matcher::Seq { name, .. }
            | Matcher::Alt { name, .. }
            | Matcher::Repeat { name, .. }
            | Matcher::Map { name, .. }
            | Matcher::Try { name, .. }
            | Matcher::Fail { name, .. }
            | Matcher::Undefined { name } => *name = new,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Matcher::Literal { .. } => "literal",
            Matcher::Dot { .. } => "dot",
            Matcher::Pattern { .. } => "pattern",
            Matcher::Eof { .. } => "eof",
            Matcher::Seq { .. } => "seq",
            Matcher::Alt { .. } => "alt",
            Matcher::Repeat { .. } => "repeat",
            Matcher::Map { .. } => "map",
            Matcher::Try { .. } => "try",
            Matcher::Fail { .. } => "fail",
            Matcher::Undefined { .. } => "undefined",
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.name())
    }
}

/// The arena of matcher nodes making up one grammar.
#[derive(Debug, Default)]
pub struct Grammar {
    nodes: Vec<Matcher>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Matcher) -> MatcherId {
        let id = MatcherId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Matches the exact `text`.
    pub fn literal(&mut self, text: &str) -> MatcherId {
        self.push(Matcher::Literal {
            name: format!("'{}'", text.escape_debug()),
            text: text.to_string(),
        })
    }

    /// Matches any single character except a newline.
    pub fn dot(&mut self) -> MatcherId {
        self.push(Matcher::Dot { name: ".".into() })
    }

    /// Matches `pattern` (a regex, implicitly anchored) against the rest of
    /// the current line.
    pub fn pattern(&mut self, pattern: &str) -> Result<MatcherId, WeftError> {
        let regex = Regex::new(&format!("^(?:{pattern})"))
            .map_err(|err| WeftError::config(format!("invalid pattern /{pattern}/: {err}")))?;
        Ok(self.push(Matcher::Pattern {
            name: format!("/{pattern}/"),
            regex,
        }))
    }

    /// Matches only at end of input.
    pub fn eof(&mut self) -> MatcherId {
        self.push(Matcher::Eof { name: "eof".into() })
    }

    /// Matches the children in order.
    pub fn seq(&mut self, children: impl IntoIterator<Item = MatcherId>) -> MatcherId {
        self.push(Matcher::Seq {
            name: "seq".into(),
            children: children.into_iter().collect(),
        })
    }

    /// Ordered choice between the children.
    pub fn alt(&mut self, children: impl IntoIterator<Item = MatcherId>) -> MatcherId {
        self.push(Matcher::Alt {
            name: "alt".into(),
            children: children.into_iter().collect(),
        })
    }

    /// Greedy repetition of `child` between `min` and `max` times.
    pub fn repeat(&mut self, child: MatcherId, min: usize, max: Option<usize>) -> MatcherId {
        self.push(Matcher::Repeat {
            name: "repeat".into(),
            child,
            min,
            max,
        })
    }

    /// Zero or more.
    pub fn star(&mut self, child: MatcherId) -> MatcherId {
        self.repeat(child, 0, None)
    }

    /// One or more.
    pub fn plus(&mut self, child: MatcherId) -> MatcherId {
        self.repeat(child, 1, None)
    }

    /// Zero or one.
    pub fn opt(&mut self, child: MatcherId) -> MatcherId {
        self.repeat(child, 0, Some(1))
    }

    /// Applies `transform` to the child's value.
    pub fn map(
        &mut self,
        child: MatcherId,
        transform: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> MatcherId {
        self.push(Matcher::Map {
            name: "map".into(),
            child,
            transform: Arc::new(transform),
        })
    }

    /// A backtracking scope around `child`: input consumed inside may be
    /// re-read after a failure, at the price of retaining it. Requires a
    /// committing pipeline.
    pub fn attempt(&mut self, child: MatcherId) -> MatcherId {
        self.push(Matcher::Try {
            name: "try".into(),
            child,
        })
    }

    /// Aborts the parse with `message` when reached.
    pub fn fail(&mut self, message: &str) -> MatcherId {
        self.push(Matcher::Fail {
            name: "fail".into(),
            message: message.to_string(),
        })
    }

    /// Reserves a named slot for a recursive reference.
    pub fn declare(&mut self, name: &str) -> MatcherId {
        self.push(Matcher::Undefined { name: name.into() })
    }

    /// Fills a declared slot with the node at `body`, keeping the declared
    /// name. The body node itself stays in the arena.
    pub fn define(&mut self, slot: MatcherId, body: MatcherId) {
        let declared = self.nodes[slot.0 as usize].name().to_string();
        let mut node = self.nodes[body.0 as usize].clone();
        node.set_name(declared);
        self.nodes[slot.0 as usize] = node;
    }

    /// Overrides a node's symbolic name (shown in traces and failure
    /// summaries).
    pub fn rename(&mut self, id: MatcherId, name: &str) {
        self.nodes[id.0 as usize].set_name(name.to_string());
    }
}

impl Index<MatcherId> for Grammar {
    type Output = Matcher;

    fn index(&self, id: MatcherId) -> &Matcher {
        &self.nodes[id.0 as usize]
    }
}
