use super::*;
use proptest::prelude::*;

/// Line by counting newlines before `offset`.
fn line_by_scan(source: &str, offset: usize) -> u32 {
    let newlines = source.as_bytes()[..offset]
        .iter()
        .filter(|&&byte| byte == b'\n')
        .count();
    u32::try_from(newlines).unwrap_or(u32::MAX) + 1
}

#[test]
fn test_newline_offsets() {
    let index = LineIndex::build("a\nbb\n");
    assert_eq!(index.offsets(), &[0, 2, 5]);
    assert_eq!(index.line_count(), 3);
}

#[test]
fn test_lines_of_short_source() {
    let index = LineIndex::build("a\nbb\n");
    assert_eq!(index.line_number(0), Some(1));
    assert_eq!(index.line_number(1), Some(1)); // the first '\n'
    assert_eq!(index.line_number(2), Some(2));
    assert_eq!(index.line_number(4), Some(2)); // the second '\n'
    assert_eq!(index.line_number(5), None); // == length
}

#[test]
fn test_out_of_range_is_unknown() {
    let index = LineIndex::build("hello");
    assert_eq!(index.line_number(4), Some(1));
    assert_eq!(index.line_number(5), None);
    assert_eq!(index.line_number(u32::MAX), None);
}

#[test]
fn test_empty_source() {
    let index = LineIndex::build("");
    assert_eq!(index.line_count(), 0);
    assert_eq!(index.line_number(0), None);
    assert_eq!(index.line_number(1), None);
    assert_eq!(index.line_start(1), None);
}

#[test]
fn test_line_start() {
    let index = LineIndex::build("line1\nline2\nline3");
    assert_eq!(index.line_start(0), None);
    assert_eq!(index.line_start(1), Some(0));
    assert_eq!(index.line_start(2), Some(6));
    assert_eq!(index.line_start(3), Some(12));
    assert_eq!(index.line_start(4), None);
}

#[test]
fn test_consecutive_newlines() {
    let index = LineIndex::build("\n\n\nx");
    assert_eq!(index.line_number(0), Some(1));
    assert_eq!(index.line_number(1), Some(2));
    assert_eq!(index.line_number(2), Some(3));
    assert_eq!(index.line_number(3), Some(4));
}

#[test]
fn test_line_col_counts_chars() {
    let source = "αβγ\nδε";
    let index = LineIndex::build(source);
    assert_eq!(index.line_col(source, 0), Some((1, 1)));
    assert_eq!(index.line_col(source, 4), Some((1, 3)));
    assert_eq!(index.line_col(source, 7), Some((2, 1)));
    assert_eq!(index.line_col(source, 9), Some((2, 2)));
    assert_eq!(index.line_col(source, 11), None);
}

#[test]
fn test_line_number_for_span() {
    let index = LineIndex::build("ab\ncd\nef");
    assert_eq!(index.line_number_for(Span::new(3, 5)), Some(2));
    assert_eq!(index.line_number_for(Span::new(20, 25)), None);
}

proptest! {
    #[test]
    fn prop_matches_newline_count(source in "[a-c\\n]{0,64}") {
        let index = LineIndex::build(&source);
        for offset in 0..source.len() {
            let offset_u32 = u32::try_from(offset).unwrap_or(u32::MAX);
            prop_assert_eq!(index.line_number(offset_u32), Some(line_by_scan(&source, offset)));
        }
        let len = u32::try_from(source.len()).unwrap_or(u32::MAX);
        prop_assert_eq!(index.line_number(len), None);
    }

    #[test]
    fn prop_offsets_strictly_increase(source in "[a\\n]{1,64}") {
        let index = LineIndex::build(&source);
        prop_assert_eq!(index.offsets()[0], 0);
        prop_assert!(index.offsets().windows(2).all(|pair| pair[0] < pair[1]));
    }
}
