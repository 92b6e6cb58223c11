//! Render-column math.
//!
//! Columns are counted per stored byte: a tab expands to the next
//! multiple-of-8 stop, a trailing newline consumes nothing, and every other
//! byte (including UTF-8 continuation bytes) occupies one column. The cursor
//! engine and the render projector both use exactly this walk, which keeps
//! wrap decisions and cursor placement in lockstep.

/// Tab stops fall on multiples of this many columns.
pub const TAB_STOP: usize = 8;

/// Render width of `bytes` in terminal columns.
pub fn columns_of(bytes: &[u8]) -> usize {
    let mut col = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\t' => col = (col / TAB_STOP + 1) * TAB_STOP,
            b'\n' if i + 1 == bytes.len() => {}
            _ => col += 1,
        }
    }
    col
}

/// Inverse of [`columns_of`]: the smallest byte offset whose accumulated
/// render width reaches or passes `target`. Clamped to `[0, len-1]` so the
/// result always indexes the line (0 for an empty line).
pub fn byte_offset_for_column(bytes: &[u8], target: usize) -> usize {
    if bytes.is_empty() {
        return 0;
    }
    let mut col = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        if col >= target {
            return i;
        }
        match b {
            b'\t' => col = (col / TAB_STOP + 1) * TAB_STOP,
            b'\n' if i + 1 == bytes.len() => {}
            _ => col += 1,
        }
    }
    bytes.len() - 1
}

/// Number of screen rows a line of `columns` render width occupies when
/// wrapped at `frame_width`, minimum one.
pub fn row_span(columns: usize, frame_width: usize) -> usize {
    assert!(frame_width > 0, "frame width must be positive");
    columns.div_ceil(frame_width).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_bytes_count_one_column_each() {
        assert_eq!(columns_of(b"abc"), 3);
        assert_eq!(columns_of(b""), 0);
    }

    #[test]
    fn trailing_newline_is_free() {
        assert_eq!(columns_of(b"abc\n"), 3);
        assert_eq!(columns_of(b"\n"), 0);
    }

    #[test]
    fn interior_newline_counts() {
        // Only the final byte gets the newline exemption; lines are split
        // before interior newlines ever reach this function in practice.
        assert_eq!(columns_of(b"a\nb"), 3);
    }

    #[test]
    fn tabs_expand_to_eight_column_stops() {
        assert_eq!(columns_of(b"\t"), 8);
        assert_eq!(columns_of(b"a\t"), 8);
        assert_eq!(columns_of(b"abcdefg\t"), 8);
        assert_eq!(columns_of(b"abcdefgh\t"), 16);
        assert_eq!(columns_of(b"\tx\n"), 9);
    }

    #[test]
    fn continuation_bytes_each_take_a_column() {
        // "é" is two bytes; per-byte accounting yields two columns.
        assert_eq!(columns_of("é\n".as_bytes()), 2);
    }

    #[test]
    fn offset_for_column_walks_tabs() {
        let line = b"a\tb\n";
        assert_eq!(byte_offset_for_column(line, 0), 0);
        assert_eq!(byte_offset_for_column(line, 1), 1); // on the tab
        assert_eq!(byte_offset_for_column(line, 8), 2); // tab jumped past 2..7
        assert_eq!(byte_offset_for_column(line, 5), 2); // mid-tab snaps forward
        assert_eq!(byte_offset_for_column(line, 9), 3); // on the newline
        assert_eq!(byte_offset_for_column(line, 100), 3); // clamped to len-1
    }

    #[test]
    fn offset_for_column_empty_line() {
        assert_eq!(byte_offset_for_column(b"", 5), 0);
    }

    #[test]
    fn inverse_law_on_tabbed_line() {
        let line = b"ab\tcd\te\n";
        for o in 0..line.len() {
            let col = columns_of(&line[..o]);
            assert_eq!(byte_offset_for_column(line, col), o, "offset {o}");
        }
    }

    #[test]
    fn row_span_minimum_one() {
        assert_eq!(row_span(0, 80), 1);
        assert_eq!(row_span(80, 80), 1);
        assert_eq!(row_span(81, 80), 2);
        assert_eq!(row_span(160, 80), 2);
        assert_eq!(row_span(161, 80), 3);
    }

    proptest! {
        // For every valid offset, mapping to a column and back lands on the
        // same byte (columns are strictly increasing per byte, so the inverse
        // is exact everywhere except past the clamped end).
        #[test]
        fn column_offset_round_trip(content in proptest::collection::vec(
            prop_oneof![Just(b'\t'), 0x20u8..0x7F], 0..64)) {
            let mut line = content.clone();
            line.push(b'\n');
            for o in 0..line.len() {
                let col = columns_of(&line[..o]);
                prop_assert_eq!(byte_offset_for_column(&line, col), o);
            }
        }
    }
}
