//! Span tests

use crate::util::span::{Position, SourceFile, Span};

// =========================================================================
// Position
// =========================================================================

#[test]
fn test_position_advance() {
    let start = Position::start();
    let after = start.advance("ab\ncd");
    assert_eq!(after.line, 2);
    assert_eq!(after.column, 3);
    assert_eq!(after.offset, 5);
}

#[test]
fn test_position_advance_counts_chars() {
    let after = Position::start().advance("é");
    assert_eq!(after.column, 2);
    assert_eq!(after.offset, 2);
}

#[test]
fn test_dummy_span() {
    assert!(Span::dummy().is_dummy());
    assert!(!Span::new(Position::start(), Position::start()).is_dummy());
}

// =========================================================================
// Span
// =========================================================================

#[test]
fn test_span_join_and_display() {
    let a = Span::new(Position::with_offset(1, 1, 0), Position::with_offset(1, 4, 3));
    let b = Span::new(Position::with_offset(2, 1, 5), Position::with_offset(2, 3, 7));
    let joined = a.to(b);

    assert_eq!(joined.start, a.start);
    assert_eq!(joined.end, b.end);
    assert_eq!(joined.len(), 7);
    assert_eq!(joined.to_string(), "[1:1 - 2:3]");
}

// =========================================================================
// SourceFile
// =========================================================================

#[test]
fn test_source_file_lines() {
    let file = SourceFile::new("a.sl".to_string(), "int x = 1;\r\nint y = 2;\n".to_string());

    assert_eq!(file.line_count(), 3);
    assert_eq!(file.line_text(1), Some("int x = 1;"));
    assert_eq!(file.line_text(2), Some("int y = 2;"));
    assert_eq!(file.line_text(3), Some(""));
    assert_eq!(file.line_text(0), None);
    assert_eq!(file.line_text(4), None);
}

#[test]
fn test_source_file_positions() {
    let file = SourceFile::new("a.sl".to_string(), "ab\ncd".to_string());
    let position = file.position_from_offset(4);
    assert_eq!((position.line, position.column), (2, 2));

    let span = file.span_from_range(3, 5);
    assert_eq!(file.source_text(span), Some("cd"));
    assert_eq!(file.to_string(), "a.sl");
}
