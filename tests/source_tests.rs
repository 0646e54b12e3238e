//! Source behavior: cursor advancement, lazy line fetching, expiration, and
//! the freeze counter.

use std::io::Cursor;

use weft::{Iter, ReadError, Source};

#[test]
fn next_walks_characters_and_wraps_at_line_ends() {
    let mut src = Source::from_text("ab\ncd");
    let (c, at) = src.next(src.start()).unwrap().unwrap();
    assert_eq!(c, 'a');
    assert_eq!(at, Iter::new(1, 2));

    let (c, at) = src.next(at).unwrap().unwrap();
    assert_eq!(c, 'b');
    assert_eq!(at, Iter::new(1, 3));

    // The newline is an ordinary character; consuming it wraps the cursor.
    let (c, at) = src.next(at).unwrap().unwrap();
    assert_eq!(c, '\n');
    assert_eq!(at, Iter::new(2, 1));

    let (c, at) = src.next(at).unwrap().unwrap();
    assert_eq!(c, 'c');
    let (c, at) = src.next(at).unwrap().unwrap();
    assert_eq!(c, 'd');
    assert_eq!(at, Iter::new(3, 1));
    assert!(src.next(at).unwrap().is_none());
}

#[test]
fn done_is_true_only_at_end_of_input() {
    let mut src = Source::from_text("a\n");
    assert!(!src.done(Iter::new(1, 1)).unwrap());
    assert!(!src.done(Iter::new(1, 2)).unwrap());
    assert!(src.done(Iter::new(2, 1)).unwrap());
}

#[test]
fn empty_input_is_done_immediately() {
    let mut src = Source::from_text("");
    assert!(src.done(src.start()).unwrap());
}

#[test]
fn reader_sources_fetch_lines_lazily() {
    let mut src = Source::from_reader(Box::new(Cursor::new(b"one\ntwo\nthree\n".to_vec())));
    let (c, _) = src.next(Iter::new(1, 1)).unwrap().unwrap();
    assert_eq!(c, 'o');
    // Jumping ahead forces the buffer to fill up to the requested line.
    let (c, _) = src.next(Iter::new(3, 1)).unwrap().unwrap();
    assert_eq!(c, 't');
    assert!(src.done(Iter::new(4, 1)).unwrap());
}

#[test]
fn expired_reads_fail_with_the_offending_cursor() {
    let mut src = Source::from_text("abc\ndef\n");
    src.expire(Iter::new(2, 2));
    assert_eq!(src.discarded_lines(), 1);

    match src.next(Iter::new(1, 1)) {
        Err(ReadError::Expired { at }) => assert_eq!(at, Iter::new(1, 1)),
        other => panic!("expected expired read, got {other:?}"),
    }
    match src.next(Iter::new(2, 1)) {
        Err(ReadError::Expired { at }) => assert_eq!(at, Iter::new(2, 1)),
        other => panic!("expected expired read, got {other:?}"),
    }
    // The frontier column itself is still readable.
    let (c, _) = src.next(Iter::new(2, 2)).unwrap().unwrap();
    assert_eq!(c, 'e');
}

#[test]
fn every_cursor_before_the_frontier_is_expired() {
    let mut src = Source::from_text("abcdef\nghijkl\n");
    src.expire(Iter::new(2, 4));

    for col in 1..=6 {
        assert!(src.next(Iter::new(1, col)).is_err());
    }
    for col in 1..4 {
        assert!(src.next(Iter::new(2, col)).is_err());
    }
    assert!(src.next(Iter::new(2, 4)).is_ok());
}

#[test]
fn freeze_suspends_expiration() {
    let mut src = Source::from_text("abc\ndef\n");
    src.freeze();
    assert_eq!(src.frozen_depth(), 1);
    src.expire(Iter::new(2, 2));
    assert_eq!(src.discarded_lines(), 0);
    // Frozen content stays readable.
    let (c, _) = src.next(Iter::new(1, 1)).unwrap().unwrap();
    assert_eq!(c, 'a');

    src.thaw();
    assert_eq!(src.frozen_depth(), 0);
    src.expire(Iter::new(2, 2));
    assert_eq!(src.discarded_lines(), 1);
}

#[test]
fn nested_freezes_must_all_release_before_expiry_resumes() {
    let mut src = Source::from_text("abc\ndef\n");
    src.freeze();
    src.freeze();
    src.thaw();
    src.expire(Iter::new(2, 1));
    assert_eq!(src.discarded_lines(), 0);
    src.thaw();
    src.expire(Iter::new(2, 1));
    assert_eq!(src.discarded_lines(), 1);
}

#[test]
fn expiring_within_the_first_line_keeps_every_line() {
    let mut src = Source::from_text("abcdef\n");
    src.expire(Iter::new(1, 4));
    assert_eq!(src.discarded_lines(), 0);
    assert_eq!(src.expired_columns(), 4);
    assert!(src.next(Iter::new(1, 3)).is_err());
    assert!(src.next(Iter::new(1, 4)).is_ok());
}
