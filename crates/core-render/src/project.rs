//! Frame projection: visible-line geometry, cursor cell, and per-row text
//! fragments.

use core_buffer::Buffer;
use core_model::{Frame, line_span};
use core_text::{utf8, width};

use crate::highlight::{Span, Style};

/// One buffer line's placement within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleLine {
    /// Line index into the buffer.
    pub index: usize,
    /// 1-based frame row of the line's first wrapped row.
    pub first_row: usize,
    /// Wrapped rows the line occupies on screen (the last visible line may
    /// be clipped below its full span).
    pub rows: usize,
}

/// Walk from `top` accumulating wrapped row spans until the frame is full.
pub fn project(buf: &Buffer, frame: Frame) -> Vec<VisibleLine> {
    let mut out = Vec::new();
    let mut row = 1usize;
    let mut idx = buf.top;
    while row <= frame.height && idx < buf.line_count() {
        let span = line_span(buf, idx, frame);
        let remaining = frame.height - row + 1;
        out.push(VisibleLine {
            index: idx,
            first_row: row,
            rows: span.min(remaining),
        });
        row += span;
        idx += 1;
    }
    out
}

/// Frame cell (1-based row, 1-based column) holding the cursor: the wrapped
/// render column folded into row steps of the frame width.
pub fn cursor_position(buf: &Buffer, frame: Frame) -> (usize, usize) {
    let col0 = buf.column - 1;
    let row = buf.cursor_line + col0 / frame.width;
    let col = col0 % frame.width + 1;
    (row, col)
}

/// A run of printable text at a frame cell, uniform in style. Tabs arrive
/// already expanded to spaces; the trailing newline is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub row: usize,
    pub col: usize,
    pub text: String,
    pub style: Style,
}

fn style_at(spans: &[Span], offset: usize) -> Style {
    spans
        .iter()
        .find(|s| s.range.contains(&offset))
        .map(|s| s.style)
        .unwrap_or(Style::Normal)
}

/// Lay one line's bytes out as fragments for its wrapped rows, starting at
/// frame row `first_row`. Columns fold at exact frame-width boundaries — the
/// same arithmetic as [`cursor_position`] and the span math — so a tab's
/// spaces split across the wrap, and a multibyte sequence (whose bytes
/// cannot split) paints whole on the row where its first column falls while
/// the column counter still advances exactly. A fragment breaks on style
/// change and on row change.
pub fn layout_line(bytes: &[u8], spans: &[Span], first_row: usize, frame: Frame) -> Vec<Fragment> {
    let mut out: Vec<Fragment> = Vec::new();
    let emit = |out: &mut Vec<Fragment>, abs_col: usize, text: String, style: Style| {
        let row = first_row + abs_col / frame.width;
        let col = abs_col % frame.width + 1;
        match out.last_mut() {
            Some(f) if f.row == row && f.style == style => f.text.push_str(&text),
            _ => out.push(Fragment {
                row,
                col,
                text,
                style,
            }),
        }
    };
    let mut at = 0usize;
    let mut abs_col = 0usize; // 0-based exact column over the whole line
    while at < bytes.len() {
        if bytes[at] == b'\n' {
            break;
        }
        let style = style_at(spans, at);
        if bytes[at] == b'\t' {
            let mut fill = width::TAB_STOP - abs_col % width::TAB_STOP;
            while fill > 0 {
                let room = frame.width - abs_col % frame.width;
                let run = fill.min(room);
                emit(&mut out, abs_col, " ".repeat(run), style);
                abs_col += run;
                fill -= run;
            }
            at += 1;
        } else {
            let seq_len = utf8::sequence_at(bytes, at);
            emit(
                &mut out,
                abs_col,
                String::from_utf8_lossy(&bytes[at..at + seq_len]).into_owned(),
                style,
            );
            abs_col += seq_len;
            at += seq_len;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{Span, Style};
    use core_buffer::Buffer;

    fn frame(width: usize, height: usize) -> Frame {
        Frame::new(width, height)
    }

    #[test]
    fn projection_walks_from_top_until_full() {
        let mut content = Vec::new();
        for i in 0..50 {
            content.extend_from_slice(format!("line {i}\n").as_bytes());
        }
        let mut buf = Buffer::from_bytes("t", &content);
        buf.top = 10;
        let vis = project(&buf, frame(80, 24));
        assert_eq!(vis.len(), 24);
        assert_eq!(vis[0], VisibleLine { index: 10, first_row: 1, rows: 1 });
        assert_eq!(vis[23], VisibleLine { index: 33, first_row: 24, rows: 1 });
    }

    #[test]
    fn wrapped_line_consumes_multiple_rows() {
        let mut content = vec![b'x'; 200];
        content.push(b'\n');
        content.extend_from_slice(b"short\n");
        let buf = Buffer::from_bytes("t", &content);
        let vis = project(&buf, frame(80, 24));
        assert_eq!(vis[0], VisibleLine { index: 0, first_row: 1, rows: 3 });
        assert_eq!(vis[1], VisibleLine { index: 1, first_row: 4, rows: 1 });
    }

    #[test]
    fn last_visible_line_is_clipped() {
        let mut content = Vec::new();
        for _ in 0..3 {
            content.extend_from_slice(b"a\n");
        }
        content.extend_from_slice(vec![b'y'; 200].as_slice());
        content.push(b'\n');
        let buf = Buffer::from_bytes("t", &content);
        let vis = project(&buf, frame(80, 4));
        assert_eq!(vis.len(), 4);
        // the wrapped line spans 3 rows but only one frame row remains
        assert_eq!(vis[3], VisibleLine { index: 3, first_row: 4, rows: 1 });
    }

    #[test]
    fn short_buffer_projects_fewer_lines_than_frame() {
        let buf = Buffer::from_bytes("t", b"a\nb\n");
        let vis = project(&buf, frame(80, 24));
        assert_eq!(vis.len(), 2);
    }

    #[test]
    fn cursor_position_folds_wrapped_column() {
        let mut buf = Buffer::from_bytes("t", b"abc\n");
        buf.cursor_line = 5;
        buf.column = 1;
        assert_eq!(cursor_position(&buf, frame(80, 24)), (5, 1));
        // column 81 on an 80-wide frame is row+1, col 1
        buf.column = 81;
        assert_eq!(cursor_position(&buf, frame(80, 24)), (6, 1));
        buf.column = 95;
        assert_eq!(cursor_position(&buf, frame(80, 24)), (6, 15));
    }

    #[test]
    fn layout_drops_trailing_newline() {
        let f = frame(80, 24);
        let frags = layout_line(b"hello\n", &[], 3, f);
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].row, 3);
        assert_eq!(frags[0].col, 1);
        assert_eq!(frags[0].text, "hello");
        assert_eq!(frags[0].style, Style::Normal);
    }

    #[test]
    fn layout_expands_tabs_to_the_next_stop() {
        let f = frame(80, 24);
        let frags = layout_line(b"a\tb\n", &[], 1, f);
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].text, "a       b"); // tab fills to column 8
    }

    #[test]
    fn layout_wraps_at_frame_width() {
        let f = frame(4, 24);
        let frags = layout_line(b"abcdefgh\n", &[], 1, f);
        assert_eq!(frags.len(), 2);
        assert_eq!((frags[0].row, frags[0].col, frags[0].text.as_str()), (1, 1, "abcd"));
        assert_eq!((frags[1].row, frags[1].col, frags[1].text.as_str()), (2, 1, "efgh"));
    }

    #[test]
    fn layout_breaks_fragments_on_style_change() {
        let f = frame(80, 24);
        let spans = vec![Span { range: 0..1, style: Style::Added }];
        let frags = layout_line(b"+new line\n", &spans, 1, f);
        assert_eq!(frags.len(), 2);
        assert_eq!((frags[0].text.as_str(), frags[0].style), ("+", Style::Added));
        assert_eq!((frags[1].text.as_str(), frags[1].style), ("new line", Style::Normal));
        assert_eq!(frags[1].col, 2);
    }

    #[test]
    fn layout_keeps_multibyte_sequences_whole() {
        // "é" is two bytes and, under byte-per-column math, two columns; it
        // starts in row 1's last cell and paints there whole, but the column
        // counter still charges it both cells
        let f = frame(3, 24);
        let frags = layout_line("ab\u{e9}cd\n".as_bytes(), &[], 1, f);
        assert_eq!(
            (frags[0].row, frags[0].col, frags[0].text.as_str()),
            (1, 1, "ab\u{e9}")
        );
        assert_eq!((frags[1].row, frags[1].col, frags[1].text.as_str()), (2, 2, "cd"));
        // the cell of the byte after the straddle agrees with the cursor math
        let mut buf = Buffer::from_bytes("t", "ab\u{e9}cd\n".as_bytes());
        buf.loff = 4; // on the 'c'
        buf.column = 5;
        assert_eq!(cursor_position(&buf, f), (2, 2));
    }

    #[test]
    fn tab_straddling_a_wrap_splits_and_matches_cursor_row() {
        // "abc\tx" is 9 columns in a width-4 frame: the tab fills row 1's
        // last cell and all of row 2, pushing 'x' to row 3 exactly as the
        // span math charges it
        let f = frame(4, 24);
        let frags = layout_line(b"abc\tx\n", &[], 1, f);
        assert_eq!(width::row_span(9, 4), 3);
        assert_eq!(
            (frags[0].row, frags[0].col, frags[0].text.as_str()),
            (1, 1, "abc ")
        );
        assert_eq!(
            (frags[1].row, frags[1].col, frags[1].text.as_str()),
            (2, 1, "    ")
        );
        let x = frags.last().unwrap();
        assert_eq!((x.row, x.col, x.text.as_str()), (3, 1, "x"));
        // the byte under 'x' computes to the same cell
        let mut buf = Buffer::from_bytes("t", b"abc\tx\n");
        buf.loff = 4;
        buf.column = 9; // columns of "abc\t" plus one
        assert_eq!(cursor_position(&buf, f), (x.row, x.col));
    }
}
