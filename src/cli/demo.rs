//! The built-in demonstration grammar: line-oriented `key = value` files
//! with `#` comments and blank lines.
//!
//! In streaming mode every line alternative is wrapped in a `try` scope, so
//! backtracking within a line stays legal while committed lines expire
//! behind the parse.

use crate::grammar::{Grammar, MatcherId};
use crate::value::{Item, Value};

/// Builds the config grammar into `grammar` and returns its root.
pub fn config_grammar(grammar: &mut Grammar, streaming: bool) -> MatcherId {
    let ws = grammar.pattern("[ \t]*").expect("static pattern compiles");
    let key = grammar
        .pattern("[A-Za-z_][A-Za-z0-9_.]*")
        .expect("static pattern compiles");
    let eq = grammar.literal("=");
    let val = grammar.pattern("[^\n]*").expect("static pattern compiles");
    let eol = grammar.literal("\n");

    let binding_parts = grammar.seq([ws, key, ws, eq, ws, val, eol]);
    let binding = grammar.map(binding_parts, |value| {
        let items = value.into_items();
        let pair = match items.as_slice() {
            [_, Item::Str(key), _, _, _, Item::Str(val), _] => Some(Item::List(vec![
                Item::Str(key.clone()),
                Item::Str(val.trim_end().to_string()),
            ])),
            _ => None,
        };
        match pair {
            Some(item) => Value::one(item),
            None => Value::from_iter(items),
        }
    });
    grammar.rename(binding, "binding");

    let comment_body = grammar.pattern("#[^\n]*").expect("static pattern compiles");
    let comment_parts = grammar.seq([ws, comment_body, eol]);
    let comment = grammar.map(comment_parts, |_| Value::empty());
    grammar.rename(comment, "comment");

    let blank_parts = grammar.seq([ws, eol]);
    let blank = grammar.map(blank_parts, |_| Value::empty());
    grammar.rename(blank, "blank");

    let line = if streaming {
        let binding = grammar.attempt(binding);
        let comment = grammar.attempt(comment);
        let blank = grammar.attempt(blank);
        grammar.alt([binding, comment, blank])
    } else {
        grammar.alt([binding, comment, blank])
    };
    grammar.rename(line, "line");

    let lines = grammar.star(line);
    let eof = grammar.eof();
    let file = grammar.seq([lines, eof]);
    grammar.rename(file, "config");
    file
}
