//! The debug trace overlay: one stable record per dispatch step.

mod common;

use common::{trace_lines, traced_pipeline};
use weft::Grammar;

#[test]
fn execute_records_carry_position_preview_depth_and_edge() {
    let mut g = Grammar::new();
    let a = g.literal("a");
    let root = g.seq([a]);
    g.rename(root, "root");

    let (pipeline, buffer) = traced_pipeline(false, false);
    assert!(pipeline.parse_text(&g, root, "abc").unwrap().is_success());

    let lines = trace_lines(&buffer);
    assert_eq!(lines.len(), 2);

    // Entering the literal from the root sequence.
    assert!(lines[0].starts_with("1,1:"), "line: {}", lines[0]);
    assert!(lines[0].contains(" 1 "), "line: {}", lines[0]);
    assert!(lines[0].ends_with("root->'a'"), "line: {}", lines[0]);

    // The literal's success, attributed to the suspended parent.
    assert!(lines[1].starts_with("1,2:"), "line: {}", lines[1]);
    assert!(lines[1].contains("root<-"), "line: {}", lines[1]);
}

#[test]
fn failure_records_use_the_triple_bang_marker() {
    let mut g = Grammar::new();
    let z = g.literal("z");
    let root = g.seq([z]);

    let (pipeline, buffer) = traced_pipeline(false, false);
    assert!(!pipeline.parse_text(&g, root, "abc").unwrap().is_success());

    let lines = trace_lines(&buffer);
    assert!(lines.iter().any(|line| line.ends_with("<-!!!")), "{lines:?}");
}

#[test]
fn previews_escape_newlines_and_pad_to_fixed_width() {
    let mut g = Grammar::new();
    let a = g.literal("a");
    let root = g.seq([a]);

    let (pipeline, buffer) = traced_pipeline(false, false);
    pipeline.parse_text(&g, root, "a\nb").unwrap();

    let lines = trace_lines(&buffer);
    // "a\nb" escaped and padded to the fixed preview width.
    assert!(lines[0].contains("a\\nb"), "line: {}", lines[0]);
    let preview = lines[0]
        .split_once(':')
        .map(|(_, rest)| &rest[..13])
        .unwrap();
    assert_eq!(preview.len(), 13);
}

#[test]
fn depth_grows_with_nesting() {
    let mut g = Grammar::new();
    let a = g.literal("a");
    let inner = g.seq([a]);
    let root = g.seq([inner]);

    let (pipeline, buffer) = traced_pipeline(false, false);
    assert!(pipeline.parse_text(&g, root, "a").unwrap().is_success());

    let lines = trace_lines(&buffer);
    // Outer execute at depth 1, inner execute at depth 2.
    assert!(lines[0].contains(" 1 "), "line: {}", lines[0]);
    assert!(lines[1].contains(" 2 "), "line: {}", lines[1]);
}

#[test]
fn tracing_does_not_change_the_outcome() {
    let mut g = Grammar::new();
    let a = g.literal("ab");
    let b = g.literal("a");
    let root = g.alt([a, b]);

    let (pipeline, _buffer) = traced_pipeline(false, true);
    let traced = pipeline.parse_text(&g, root, "ab").unwrap();
    let plain = weft::parse(&g, root, "ab").unwrap();
    assert_eq!(traced, plain);
}
