//! Committed parsing: `try` scopes, expiration during a parse, conversion of
//! expired look-backs into ordinary failures, and streaming over a reader.

mod common;

use std::io::Cursor;

use common::{rendered_items, success_value};
use weft::{Grammar, Iter, Outcome, ParsePipeline, Source};

#[test]
fn try_allows_backtracking_over_consumed_input() {
    let mut g = Grammar::new();
    let ab = g.literal("ab");
    let guarded = g.attempt(ab);
    let ac = g.literal("ac");
    let root = g.alt([guarded, ac]);

    let pipeline = ParsePipeline::committing();
    let mut source = Source::from_text("ac");
    let value = success_value(pipeline.parse(&g, root, &mut source).unwrap());

    assert_eq!(rendered_items(&value), vec!["ac"]);
    assert_eq!(source.frozen_depth(), 0);
    // Nothing was discarded inside the scope; the commit after the final
    // success claims the consumed prefix of the single line.
    assert_eq!(source.discarded_lines(), 0);
    assert_eq!(source.expired_columns(), 3);
}

#[test]
fn backtracking_past_a_commit_point_fails_instead_of_crashing() {
    let mut g = Grammar::new();
    let first = g.literal("abc\n");
    let tail = g.literal("zzz");
    let committed = g.seq([first, tail]);
    let lookback = g.literal("a");
    let root = g.alt([committed, lookback]);

    let pipeline = ParsePipeline::committing();
    let mut source = Source::from_text("abc\ndef\n");
    let outcome = pipeline.parse(&g, root, &mut source).unwrap();

    // The first branch commits line 1 before failing; the second branch
    // would have to re-read it. That read expires and becomes a failure.
    assert!(!outcome.is_success());
    assert_eq!(source.frozen_depth(), 0);
    assert_eq!(source.discarded_lines(), 1);
}

#[test]
fn try_scope_preserves_the_alternative_after_a_committed_line() {
    let mut g = Grammar::new();
    let first = g.literal("abc\n");
    let tail = g.literal("zzz");
    let inner = g.seq([first, tail]);
    let guarded = g.attempt(inner);
    let first_again = g.literal("abc\n");
    let def = g.literal("def");
    let fallback = g.seq([first_again, def]);
    let root = g.alt([guarded, fallback]);

    let pipeline = ParsePipeline::committing();
    let mut source = Source::from_text("abc\ndef");
    let outcome = pipeline.parse(&g, root, &mut source).unwrap();

    match outcome {
        Outcome::Success { end, .. } => assert_eq!(end, Iter::new(2, 4)),
        Outcome::Failure(summary) => panic!("unexpected failure: {summary:?}"),
    }
    assert_eq!(source.frozen_depth(), 0);
    assert_eq!(source.discarded_lines(), 1);
}

#[test]
fn frozen_depth_returns_to_zero_after_a_failed_parse() {
    let mut g = Grammar::new();
    let x = g.literal("x");
    let root = g.attempt(x);

    let pipeline = ParsePipeline::committing();
    let mut source = Source::from_text("y");
    let outcome = pipeline.parse(&g, root, &mut source).unwrap();

    assert!(!outcome.is_success());
    assert_eq!(source.frozen_depth(), 0);
}

#[test]
fn nested_try_scopes_balance() {
    let mut g = Grammar::new();
    let a = g.literal("a");
    let b = g.literal("b");
    let inner = g.attempt(b);
    let pair = g.seq([a, inner]);
    let outer = g.attempt(pair);
    let fallback = g.literal("ax");
    let root = g.alt([outer, fallback]);

    let pipeline = ParsePipeline::committing();
    let mut source = Source::from_text("ax");
    let outcome = pipeline.parse(&g, root, &mut source).unwrap();

    assert!(outcome.is_success());
    assert_eq!(source.frozen_depth(), 0);
}

#[test]
fn streaming_parse_discards_committed_lines() {
    let mut g = Grammar::new();
    let word = g.pattern("[a-z]+").unwrap();
    let eol = g.literal("\n");
    let line = g.seq([word, eol]);
    let guarded = g.attempt(line);
    let lines = g.star(guarded);
    let eof = g.eof();
    let root = g.seq([lines, eof]);

    let text: String = (0..100).map(|_| "word\n").collect();
    let pipeline = ParsePipeline::committing();
    let mut source = Source::from_reader(Box::new(Cursor::new(text.into_bytes())));
    let outcome = pipeline.parse(&g, root, &mut source).unwrap();

    assert!(outcome.is_success());
    assert_eq!(source.frozen_depth(), 0);
    assert_eq!(source.discarded_lines(), 100);
}

#[test]
fn commit_mode_changes_nothing_for_a_grammar_that_never_backtracks() {
    let mut g = Grammar::new();
    let a = g.literal("hello ");
    let b = g.literal("world");
    let root = g.seq([a, b]);

    let plain = ParsePipeline::new()
        .parse_text(&g, root, "hello world")
        .unwrap();
    let pipeline = ParsePipeline::committing();
    let mut source = Source::from_text("hello world");
    let committed = pipeline.parse(&g, root, &mut source).unwrap();

    assert_eq!(plain, committed);
}
